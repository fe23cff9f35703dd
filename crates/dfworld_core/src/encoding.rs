use std::borrow::Cow;

/// An encoding for interpreting byte data as UTF-8 text.
pub trait Encoding {
    /// Decodes bytes into a utf-8 compatible string -- allocating if necessary
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str>;
}

impl<T: Encoding + ?Sized> Encoding for &'_ T {
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        (**self).decode(data)
    }
}

impl<T: Encoding + ?Sized> Encoding for Box<T> {
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        (**self).decode(data)
    }
}

/// Decodes bytes according to code page 437, the encoding Dwarf Fortress
/// uses for every name stored in a save.
///
/// The lower half is plain ASCII.
///
/// ```
/// use dfworld_core::encoding::{Cp437Encoding, Encoding};
///
/// let encoding = Cp437Encoding::new();
/// assert_eq!(encoding.decode(b"Thur Minbaz"), "Thur Minbaz");
/// assert_eq!(encoding.decode(b"\xad\x78\x21"), "¡x!");
/// assert_eq!(encoding.decode(b"\xb0\xdb\xfe"), "░█■");
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Cp437Encoding;

impl Cp437Encoding {
    pub fn new() -> Self {
        Cp437Encoding
    }

    /// Static method for decoding code page 437 data
    pub fn decode(data: &[u8]) -> Cow<'_, str> {
        decode_cp437(data)
    }
}

impl Encoding for Cp437Encoding {
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        Cp437Encoding::decode(data)
    }
}

pub(crate) fn decode_cp437(data: &[u8]) -> Cow<'_, str> {
    if data.is_ascii() {
        if let Ok(s) = std::str::from_utf8(data) {
            return Cow::Borrowed(s);
        }
    }

    let mut out = String::with_capacity(data.len() * 2);
    out.extend(data.iter().map(|&b| cp437_char(b)));
    Cow::Owned(out)
}

#[inline]
fn cp437_char(b: u8) -> char {
    if b.is_ascii() {
        b as char
    } else {
        CP437_HIGH[usize::from(b - 0x80)]
    }
}

static CP437_HIGH: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xa0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xb0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xc0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xd0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xe0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xf0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_accented_punctuation() {
        let bytes = [
            0xae, 0x9c, 0x6f, 0x76, 0x65, 0x6c, 0x79, 0x20, 0x70, 0x69, 0xa4, 0x61, 0x74, 0x61,
            0xaf,
        ];
        assert_eq!(Cp437Encoding::decode(&bytes), "«£ovely piñata»");
        assert_eq!(Cp437Encoding::decode(&[0xad, 0x78, 0x21]), "¡x!");
    }

    #[test]
    fn empty_input_is_empty_string() {
        assert_eq!(Cp437Encoding::decode(&[]), "");
    }

    #[test]
    fn ascii_input_is_borrowed() {
        assert!(matches!(Cp437Encoding::decode(b"Avuzdakost"), Cow::Borrowed(_)));
    }

    #[test]
    fn every_high_byte_maps_to_a_distinct_non_ascii_char() {
        let all: Vec<u8> = (0x80..=0xff).collect();
        let decoded = Cp437Encoding::decode(&all);
        let chars: Vec<char> = decoded.chars().collect();
        assert_eq!(chars.len(), 128);
        assert!(chars.iter().all(|c| !c.is_ascii()));

        let mut unique = chars.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 128);
    }

    #[test]
    fn trait_objects_decode_through_references() {
        let boxed: Box<dyn Encoding> = Box::new(Cp437Encoding::new());
        assert_eq!(boxed.decode(&[0x82]), "é");
        assert_eq!((&Cp437Encoding).decode(&[0x81]), "ü");
    }
}
