//! Décodage des fichiers texte et détection du séparateur CSV

use std::borrow::Cow;

/// Décode des bytes en texte : UTF-8 si valide (BOM retiré), sinon Windows-1252
///
/// Les exports de tableur des campagnes sont souvent en Latin-1/CP1252.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    match simdutf8::basic::from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(data);
            if had_errors {
                tracing::warn!("Input is neither UTF-8 nor Windows-1252, some characters were replaced");
            }
            decoded
        }
    }
}

/// Détecte le séparateur à partir de la ligne d'en-tête
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let bytes = header.as_bytes();

    let commas = memchr::memchr_iter(b',', bytes).count();
    let semicolons = memchr::memchr_iter(b';', bytes).count();
    let tabs = memchr::memchr_iter(b'\t', bytes).count();

    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// Parse une cellule numérique. `decimal_comma` autorise "-5,2".
///
/// Retourne `None` pour une cellule vide, non numérique ou non finie.
#[inline]
pub fn parse_number(raw: &str, decimal_comma: bool) -> Option<f64> {
    let v = raw.trim().trim_start_matches('+');
    if v.is_empty() {
        return None;
    }

    let value = if decimal_comma && v.contains(',') {
        fast_float::parse::<f64, _>(v.replace(',', ".")).ok()?
    } else {
        fast_float::parse::<f64, _>(v).ok()?
    };

    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        let data = b"\xEF\xBB\xBFIndex,LineLabel\n";
        assert_eq!(decode(data), "Index,LineLabel\n");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Açu" en CP1252
        let data = b"A\xE7u";
        assert_eq!(decode(data), "Açu");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Index,LineLabel,Date\n1,A,x"), b',');
        assert_eq!(detect_delimiter("Index;LineLabel;Date\n1;A;x"), b';');
        assert_eq!(detect_delimiter("Index\tLineLabel\tDate"), b'\t');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("-35.0", false), Some(-35.0));
        assert_eq!(parse_number(" +5.25 ", false), Some(5.25));
        assert_eq!(parse_number("-5,2", true), Some(-5.2));
        assert_eq!(parse_number("-5,2", false), None);
        assert_eq!(parse_number("", false), None);
        assert_eq!(parse_number("NA", false), None);
        assert_eq!(parse_number("inf", false), None);
    }
}
