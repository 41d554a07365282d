use std::collections::BTreeMap;

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

fn table_tag(tag: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*tag)
}

fn push_u16(data: &mut Vec<u8>, value: u16) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn push_i16(data: &mut Vec<u8>, value: i16) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(data: &mut Vec<u8>, value: u32) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// Transform carried by a composite glyph component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestTransform {
    None,
    Scale,
    XyScale,
    TwoByTwo,
}

/// A component of a synthesized composite glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestComponent {
    pub glyph_id: u16,
    pub word_args: bool,
    pub transform: TestTransform,
}

/// A glyph of a synthesized font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestGlyph {
    Empty,
    Simple(Vec<u8>),
    Composite {
        components: Vec<TestComponent>,
        instructions: Option<Vec<u8>>,
    },
}

/// Writes a complete TrueType font in memory.
#[derive(Debug, Clone)]
pub struct TestFontBuilder {
    glyphs: Vec<TestGlyph>,
    mappings: BTreeMap<u16, u16>,
    num_h_metrics: Option<u16>,
    short_loca: bool,
    cmap_records: Vec<(u16, u16)>,
    cmap_format: u16,
    glyph_id_array: bool,
    sfnt_version: u32,
    extra_tables: BTreeMap<u32, Vec<u8>>,
    removed_tables: Vec<u32>,
}

#[allow(dead_code)]
impl TestComponent {
    pub fn new(glyph_id: u16) -> Self {
        TestComponent {
            glyph_id,
            word_args: false,
            transform: TestTransform::None,
        }
    }

    pub fn word_args(mut self) -> Self {
        self.word_args = true;
        self
    }

    pub fn transform(mut self, transform: TestTransform) -> Self {
        self.transform = transform;
        self
    }

    fn write(&self, data: &mut Vec<u8>, more: bool, instructions: bool) {
        let mut flags = ARGS_ARE_XY_VALUES;
        if self.word_args {
            flags |= ARG_1_AND_2_ARE_WORDS;
        }
        flags |= match self.transform {
            TestTransform::None => 0,
            TestTransform::Scale => WE_HAVE_A_SCALE,
            TestTransform::XyScale => WE_HAVE_AN_X_AND_Y_SCALE,
            TestTransform::TwoByTwo => WE_HAVE_A_TWO_BY_TWO,
        };
        if more {
            flags |= MORE_COMPONENTS;
        }
        if instructions {
            flags |= WE_HAVE_INSTRUCTIONS;
        }

        push_u16(data, flags);
        push_u16(data, self.glyph_id);
        if self.word_args {
            push_i16(data, 300);
            push_i16(data, -20);
        } else {
            data.extend_from_slice(&[10, 20]);
        }
        // 1.0 and 0.0 in F2DOT14
        let transform: &[u16] = match self.transform {
            TestTransform::None => &[],
            TestTransform::Scale => &[0x4000],
            TestTransform::XyScale => &[0x4000, 0x2000],
            TestTransform::TwoByTwo => &[0x4000, 0, 0, 0x4000],
        };
        for &value in transform {
            push_u16(data, value);
        }
    }
}

#[allow(dead_code)]
impl TestGlyph {
    /// A single contour glyph with one point at (`seed`, `seed`).
    pub fn simple(seed: u8) -> Self {
        let mut data = Vec::new();
        push_i16(&mut data, 1); // number_of_contours
        push_i16(&mut data, 0);
        push_i16(&mut data, 0);
        push_i16(&mut data, i16::from(seed));
        push_i16(&mut data, i16::from(seed));
        push_u16(&mut data, 0); // end point of contour 0
        push_u16(&mut data, 0); // instruction length
        data.push(0x37); // on curve, positive short x and y
        data.push(seed);
        data.push(seed);
        TestGlyph::Simple(data)
    }

    pub fn composite(components: Vec<TestComponent>) -> Self {
        TestGlyph::Composite {
            components,
            instructions: None,
        }
    }

    pub fn composite_with_instructions(
        components: Vec<TestComponent>,
        instructions: Vec<u8>,
    ) -> Self {
        TestGlyph::Composite {
            components,
            instructions: Some(instructions),
        }
    }

    pub fn data(&self) -> Vec<u8> {
        match self {
            TestGlyph::Empty => Vec::new(),
            TestGlyph::Simple(data) => data.clone(),
            TestGlyph::Composite {
                components,
                instructions,
            } => {
                let mut data = Vec::new();
                push_i16(&mut data, -1);
                data.extend_from_slice(&[0; 8]);
                for (i, component) in components.iter().enumerate() {
                    let more = i + 1 < components.len();
                    component.write(&mut data, more, !more && instructions.is_some());
                }
                if let Some(instructions) = instructions {
                    push_u16(&mut data, instructions.len() as u16);
                    data.extend_from_slice(instructions);
                }
                data
            }
        }
    }
}

#[allow(dead_code)]
impl TestFontBuilder {
    pub fn new(glyphs: Vec<TestGlyph>) -> Self {
        TestFontBuilder {
            glyphs,
            mappings: BTreeMap::new(),
            num_h_metrics: None,
            short_loca: false,
            cmap_records: vec![(0, 3), (3, 1)],
            cmap_format: 4,
            glyph_id_array: false,
            sfnt_version: 0x00010000,
            extra_tables: BTreeMap::new(),
            removed_tables: Vec::new(),
        }
    }

    pub fn simple_glyphs(count: u8) -> Vec<TestGlyph> {
        (0..count).map(TestGlyph::simple).collect()
    }

    /// Map character `code` to `glyph_id` in the (3, 1) character map.
    pub fn map(mut self, code: u16, glyph_id: u16) -> Self {
        self.mappings.insert(code, glyph_id);
        self
    }

    pub fn num_h_metrics(mut self, num_h_metrics: u16) -> Self {
        self.num_h_metrics = Some(num_h_metrics);
        self
    }

    pub fn short_loca(mut self) -> Self {
        self.short_loca = true;
        self
    }

    /// Replace the `(platform, encoding)` pairs of the character map encoding records.
    pub fn cmap_records(mut self, records: Vec<(u16, u16)>) -> Self {
        self.cmap_records = records;
        self
    }

    /// Write a character map sub-table of `format` with no mappings instead of format 4.
    pub fn cmap_format(mut self, format: u16) -> Self {
        self.cmap_format = format;
        self
    }

    /// Store the mappings in the glyph id array rather than as deltas.
    pub fn glyph_id_array(mut self) -> Self {
        self.glyph_id_array = true;
        self
    }

    pub fn sfnt_version(mut self, sfnt_version: u32) -> Self {
        self.sfnt_version = sfnt_version;
        self
    }

    pub fn with_table(mut self, tag: u32, data: Vec<u8>) -> Self {
        self.extra_tables.insert(tag, data);
        self
    }

    pub fn without_table(mut self, tag: u32) -> Self {
        self.removed_tables.push(tag);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_at(0)
    }

    /// Write a font collection holding `fonts`.
    pub fn collection(fonts: &[TestFontBuilder]) -> Vec<u8> {
        let header_length = 12 + 4 * fonts.len();
        let mut offsets = Vec::with_capacity(fonts.len());
        let mut offset = header_length;
        for font in fonts {
            offsets.push(offset);
            offset += (font.build().len() + 3) & !3;
        }

        let mut data = Vec::new();
        push_u32(&mut data, table_tag(b"ttcf"));
        push_u16(&mut data, 1);
        push_u16(&mut data, 0);
        push_u32(&mut data, fonts.len() as u32);
        for &offset in &offsets {
            push_u32(&mut data, offset as u32);
        }
        for (font, &offset) in fonts.iter().zip(&offsets) {
            data.resize(offset, 0);
            data.extend_from_slice(&font.build_at(offset));
        }
        data
    }

    fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    fn tables(&self) -> BTreeMap<u32, Vec<u8>> {
        let (glyf, loca) = self.glyf_and_loca();
        let mut tables = BTreeMap::new();
        tables.insert(table_tag(b"head"), self.head());
        tables.insert(table_tag(b"maxp"), self.maxp());
        tables.insert(table_tag(b"hhea"), self.hhea());
        tables.insert(table_tag(b"hmtx"), self.hmtx());
        tables.insert(table_tag(b"OS/2"), self.os2());
        tables.insert(table_tag(b"post"), self.post());
        tables.insert(table_tag(b"name"), vec![0, 0, 0, 0, 0, 6]);
        tables.insert(table_tag(b"cmap"), self.cmap());
        tables.insert(table_tag(b"glyf"), glyf);
        tables.insert(table_tag(b"loca"), loca);
        for (&tag, data) in &self.extra_tables {
            tables.insert(tag, data.clone());
        }
        for tag in &self.removed_tables {
            tables.remove(tag);
        }
        tables
    }

    fn build_at(&self, base: usize) -> Vec<u8> {
        let tables = self.tables();
        let num_tables = tables.len();
        let mut data = Vec::new();
        push_u32(&mut data, self.sfnt_version);
        push_u16(&mut data, num_tables as u16);
        let exponent = (num_tables as u32).checked_ilog2().unwrap_or(0);
        let search_range = (1u16 << exponent) * 16;
        push_u16(&mut data, search_range);
        push_u16(&mut data, exponent as u16);
        push_u16(&mut data, num_tables as u16 * 16 - search_range);

        let mut offset = 12 + 16 * num_tables;
        let mut head_offset = None;
        for (&tag, table) in &tables {
            if tag == table_tag(b"head") {
                head_offset = Some(offset);
            }
            push_u32(&mut data, tag);
            push_u32(&mut data, checksum(table));
            push_u32(&mut data, (base + offset) as u32);
            push_u32(&mut data, table.len() as u32);
            offset += (table.len() + 3) & !3;
        }
        for table in tables.values() {
            data.extend_from_slice(table);
            data.resize((data.len() + 3) & !3, 0);
        }

        if let Some(head_offset) = head_offset {
            let adjustment = 0xB1B0AFBAu32.wrapping_sub(checksum(&data));
            let field = head_offset + 8;
            data[field..field + 4].copy_from_slice(&adjustment.to_be_bytes());
        }
        data
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut offsets = vec![0];
        for glyph in &self.glyphs {
            glyf.extend_from_slice(&glyph.data());
            if self.short_loca && glyf.len() % 2 != 0 {
                glyf.push(0);
            }
            offsets.push(glyf.len() as u32);
        }

        let mut loca = Vec::new();
        for offset in offsets {
            if self.short_loca {
                push_u16(&mut loca, (offset / 2) as u16);
            } else {
                push_u32(&mut loca, offset);
            }
        }
        (glyf, loca)
    }

    fn head(&self) -> Vec<u8> {
        let mut data = Vec::new();
        push_u16(&mut data, 1);
        push_u16(&mut data, 0);
        push_u32(&mut data, 0x00010000); // font_revision
        push_u32(&mut data, 0); // check_sum_adjustment
        push_u32(&mut data, 0x5F0F3CF5);
        push_u16(&mut data, 0x000B);
        push_u16(&mut data, 1000); // units_per_em
        data.extend_from_slice(&3_600_000_000i64.to_be_bytes()); // created
        data.extend_from_slice(&3_700_000_000i64.to_be_bytes()); // modified
        push_i16(&mut data, 0);
        push_i16(&mut data, -200);
        push_i16(&mut data, 1000);
        push_i16(&mut data, 800);
        push_u16(&mut data, 0); // mac_style
        push_u16(&mut data, 8); // lowest_rec_ppem
        push_i16(&mut data, 2); // font_direction_hint
        push_i16(&mut data, if self.short_loca { 0 } else { 1 });
        push_i16(&mut data, 0); // glyph_data_format
        data
    }

    fn maxp(&self) -> Vec<u8> {
        let mut data = Vec::new();
        push_u32(&mut data, 0x00010000);
        push_u16(&mut data, self.num_glyphs());
        for value in [64, 4, 128, 8, 2, 0, 16, 4, 0, 256, 512, 3, 2] {
            push_u16(&mut data, value);
        }
        data
    }

    fn hhea(&self) -> Vec<u8> {
        let mut data = Vec::new();
        push_u16(&mut data, 1);
        push_u16(&mut data, 0);
        push_i16(&mut data, 800);
        push_i16(&mut data, -200);
        push_i16(&mut data, 90);
        push_u16(&mut data, 500 + 10 * self.num_glyphs());
        for value in [0, 0, 1000, 1, 0, 0, 0, 0, 0, 0, 0] {
            push_i16(&mut data, value);
        }
        push_u16(&mut data, self.num_h_metrics.unwrap_or(self.num_glyphs()));
        data
    }

    /// Glyph `i` has an advance of `500 + 10 * i` and a left side bearing of `i`.
    fn hmtx(&self) -> Vec<u8> {
        let num_h_metrics = self.num_h_metrics.unwrap_or(self.num_glyphs());
        let mut data = Vec::new();
        for glyph_id in 0..self.num_glyphs() {
            if glyph_id < num_h_metrics {
                push_u16(&mut data, 500 + 10 * glyph_id);
            }
            push_i16(&mut data, glyph_id as i16);
        }
        data
    }

    fn os2(&self) -> Vec<u8> {
        let first = self.mappings.keys().next().copied().unwrap_or(0);
        let last = self.mappings.keys().last().copied().unwrap_or(0);
        let mut data = Vec::new();
        push_u16(&mut data, 4);
        push_i16(&mut data, 520); // avg_char_width
        push_u16(&mut data, 400);
        push_u16(&mut data, 5);
        push_u16(&mut data, 0); // fs_type
        for value in [650, 600, 0, 75, 650, 600, 0, 350, 50, 250, 0] {
            push_i16(&mut data, value);
        }
        data.extend_from_slice(&[2, 11, 6, 4, 2, 2, 2, 2, 2, 4]); // panose
        for value in [0x0000_0003, 0, 0, 0] {
            push_u32(&mut data, value);
        }
        data.extend_from_slice(b"TEST");
        push_u16(&mut data, 0x0040); // fs_selection
        push_u16(&mut data, first);
        push_u16(&mut data, last);
        push_i16(&mut data, 800);
        push_i16(&mut data, -200);
        push_i16(&mut data, 90);
        push_u16(&mut data, 1000);
        push_u16(&mut data, 250);
        push_u32(&mut data, 1);
        push_u32(&mut data, 0);
        push_i16(&mut data, 500); // x_height
        push_i16(&mut data, 700); // cap_height
        push_u16(&mut data, 0);
        push_u16(&mut data, 0x20);
        push_u16(&mut data, 2); // max_context
        data
    }

    fn post(&self) -> Vec<u8> {
        let mut data = Vec::new();
        push_u32(&mut data, 0x00020000);
        push_u32(&mut data, 0); // italic_angle
        push_i16(&mut data, -100);
        push_i16(&mut data, 50);
        push_u32(&mut data, 0);
        for value in [1024, 2048, 4096, 8192] {
            push_u32(&mut data, value);
        }
        push_u16(&mut data, self.num_glyphs());
        for _ in 0..self.num_glyphs() {
            push_u16(&mut data, 0);
        }
        data
    }

    fn cmap(&self) -> Vec<u8> {
        let sub_table = if self.cmap_format == 4 {
            self.cmap_format4()
        } else {
            let mut data = Vec::new();
            push_u16(&mut data, self.cmap_format);
            data.extend_from_slice(&[0; 14]);
            data
        };

        let mut data = Vec::new();
        push_u16(&mut data, 0);
        push_u16(&mut data, self.cmap_records.len() as u16);
        let offset = 4 + 8 * self.cmap_records.len() as u32;
        for &(platform_id, encoding_id) in &self.cmap_records {
            push_u16(&mut data, platform_id);
            push_u16(&mut data, encoding_id);
            push_u32(&mut data, offset);
        }
        data.extend_from_slice(&sub_table);
        data
    }

    fn cmap_format4(&self) -> Vec<u8> {
        // Each element is (start, end, delta, glyph array start)
        let mut segments: Vec<(u16, u16, i16, Option<usize>)> = Vec::new();
        let mut glyph_id_array = Vec::new();
        for (&code, &glyph_id) in &self.mappings {
            if self.glyph_id_array {
                match segments.last_mut() {
                    Some(segment) if segment.1 + 1 == code => segment.1 = code,
                    _ => segments.push((code, code, 0, Some(glyph_id_array.len()))),
                }
                glyph_id_array.push(glyph_id);
            } else {
                segments.push((code, code, glyph_id.wrapping_sub(code) as i16, None));
            }
        }
        segments.push((0xFFFF, 0xFFFF, 1, None));

        let seg_count = segments.len();
        let length = 16 + 8 * seg_count + 2 * glyph_id_array.len();
        let exponent = (seg_count as u32).ilog2();
        let search_range = 2 * (1u16 << exponent);

        let mut data = Vec::new();
        push_u16(&mut data, 4);
        push_u16(&mut data, length as u16);
        push_u16(&mut data, 0);
        push_u16(&mut data, 2 * seg_count as u16);
        push_u16(&mut data, search_range);
        push_u16(&mut data, exponent as u16);
        push_u16(&mut data, 2 * seg_count as u16 - search_range);
        for segment in &segments {
            push_u16(&mut data, segment.1);
        }
        push_u16(&mut data, 0);
        for segment in &segments {
            push_u16(&mut data, segment.0);
        }
        for segment in &segments {
            push_i16(&mut data, segment.2);
        }
        for (i, segment) in segments.iter().enumerate() {
            let id_range_offset = segment.3.map_or(0, |start| 2 * (seg_count - i + start));
            push_u16(&mut data, id_range_offset as u16);
        }
        for glyph_id in glyph_id_array {
            push_u16(&mut data, glyph_id);
        }
        data
    }
}
