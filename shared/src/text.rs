/// Lowercases and strips the diacritics found in Spanish and other Latin
/// scripts, so "José", "JOSE" and "jose" compare equal.
pub fn fold(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Substring match used by guest search on both sides of the wire: folded name
/// substring, or digit substring of the phone when the query has digits.
pub fn matches_guest(nombre: &str, telefono: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    if fold(nombre).contains(&fold(query)) {
        return true;
    }

    let query_digits: String = query.chars().filter(|c| c.is_ascii_digit()).collect();
    !query_digits.is_empty()
        && telefono
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .contains(&query_digits)
}
