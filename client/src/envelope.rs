//! One shape for every listing, whatever envelope the endpoint uses.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMeta {
    /// Server-reported total, independent of the page.
    pub total: usize,
    /// 1-based page number; always 1 for unpaginated listings.
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

impl<T> Listing<T> {
    /// A complete, unpaginated listing.
    pub fn whole(data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            data,
            meta: ListMeta {
                total,
                page: 1,
                total_pages: 1,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::whole(vec![])
    }
}

/// `{invitados, total, pagina, limite, totalPaginas}`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuestPage<T> {
    pub invitados: Vec<T>,
    pub total: usize,
    pub pagina: usize,
    pub total_paginas: usize,
}

impl<T> From<GuestPage<T>> for Listing<T> {
    fn from(page: GuestPage<T>) -> Self {
        Listing {
            data: page.invitados,
            meta: ListMeta {
                total: page.total,
                page: page.pagina,
                total_pages: page.total_paginas,
            },
        }
    }
}

/// `{invitados: [...]}`
#[derive(Deserialize)]
pub(crate) struct Invitados<T> {
    pub invitados: Vec<T>,
}

/// `{listas: [...]}`
#[derive(Deserialize)]
pub(crate) struct Listas<T> {
    pub listas: Vec<T>,
}

/// `{ok, plantillas: [...]}`
#[derive(Deserialize)]
pub(crate) struct Plantillas<T> {
    #[serde(default = "Vec::new")]
    pub plantillas: Vec<T>,
}

/// `{bodas: [...]}`
#[derive(Deserialize)]
pub(crate) struct Bodas<T> {
    pub bodas: Vec<T>,
}
