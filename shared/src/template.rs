use crate::models::{Boda, Invitado};

/// Values substituted into template shortcodes.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub nombre: String,
    pub enlace: String,
    pub acompanantes: u32,
    pub boda: String,
    pub fecha: String,
}

impl RenderContext {
    pub fn for_guest(invitado: &Invitado, boda: &Boda, enlace: &str) -> Self {
        Self {
            nombre: invitado.nombre.clone(),
            enlace: enlace.to_string(),
            acompanantes: invitado.num_acompanantes,
            boda: boda.nombre.clone(),
            fecha: boda
                .fecha
                .map(|f| f.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "nombre" => Some(self.nombre.clone()),
            "enlace" => Some(self.enlace.clone()),
            "acompanantes" => Some(self.acompanantes.to_string()),
            "boda" => Some(self.boda.clone()),
            "fecha" => Some(self.fecha.clone()),
            _ => None,
        }
    }
}

/// Replaces `{nombre}`, `{enlace}`, `{acompanantes}`, `{boda}` and `{fecha}`.
/// Unknown shortcodes and unbalanced braces are copied through untouched.
pub fn render(contenido: &str, ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(contenido.len());
    let mut rest = contenido;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match ctx.lookup(key.trim()) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext {
        RenderContext {
            nombre: "Lucía".to_string(),
            enlace: "https://bodas.example/acceso?token=abc".to_string(),
            acompanantes: 2,
            boda: "Boda X".to_string(),
            fecha: "12/09/2026".to_string(),
        }
    }

    #[test]
    fn test_render_known_shortcodes() {
        let rendered = render(
            "Hola {nombre}, te esperamos en {boda} el {fecha} con {acompanantes} acompañantes: {enlace}",
            &ctx(),
        );
        assert_eq!(
            rendered,
            "Hola Lucía, te esperamos en Boda X el 12/09/2026 con 2 acompañantes: https://bodas.example/acceso?token=abc"
        );
    }

    #[test]
    fn test_unknown_and_unbalanced_are_kept() {
        assert_eq!(render("Hola {apodo}", &ctx()), "Hola {apodo}");
        assert_eq!(render("Hola {nombre", &ctx()), "Hola {nombre");
        assert_eq!(render("", &ctx()), "");
    }
}
