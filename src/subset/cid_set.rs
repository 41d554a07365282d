/// The set of glyphs present in a subset font, one bit per glyph.
///
/// Bits are stored most significant first so glyph 0 is the high bit of the first byte. This
/// is the layout of the `CIDSet` stream in a PDF font descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidSet {
    bytes: Vec<u8>,
    num_glyphs: usize,
}

impl CidSet {
    /// A set containing the glyphs `0..num_glyphs`.
    pub fn new(num_glyphs: usize) -> Self {
        let full_bytes = num_glyphs / 8;
        let remaining_bits = num_glyphs % 8;
        let mut bytes = vec![0xFF; full_bytes];
        if remaining_bits != 0 {
            bytes.push(0xFF << (8 - remaining_bits));
        }

        CidSet { bytes, num_glyphs }
    }

    /// Returns `true` if `glyph_id` is in the set.
    pub fn contains(&self, glyph_id: u16) -> bool {
        let index = usize::from(glyph_id);
        self.bytes
            .get(index / 8)
            .map_or(false, |byte| byte & (0x80 >> (index % 8)) != 0)
    }

    /// Number of glyphs in the set.
    pub fn len(&self) -> usize {
        self.num_glyphs
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.num_glyphs == 0
    }

    /// The encoded bitmap.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the set, returning the encoded bitmap.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
