//! Shared test code.

include!("../tests/common.rs");

pub(crate) mod writer {
    //! Big-endian test data from a list of typed values.

    #![allow(dead_code)]

    #[derive(Debug, Clone, Copy)]
    pub enum TtfType {
        Raw(&'static [u8]),
        Int8(i8),
        UInt8(u8),
        Int16(i16),
        UInt16(u16),
        Int32(i32),
        UInt32(u32),
    }

    impl TtfType {
        fn push_to(self, data: &mut Vec<u8>) {
            match self {
                TtfType::Raw(bytes) => data.extend_from_slice(bytes),
                TtfType::Int8(n) => data.extend(n.to_be_bytes()),
                TtfType::UInt8(n) => data.push(n),
                TtfType::Int16(n) => data.extend(n.to_be_bytes()),
                TtfType::UInt16(n) => data.extend(n.to_be_bytes()),
                TtfType::Int32(n) => data.extend(n.to_be_bytes()),
                TtfType::UInt32(n) => data.extend(n.to_be_bytes()),
            }
        }
    }

    pub fn convert(values: &[TtfType]) -> Vec<u8> {
        let mut data = Vec::new();
        for value in values {
            value.push_to(&mut data);
        }
        data
    }

    pub fn patch_u16(data: &mut [u8], offset: usize, value: u16) {
        data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn patch_u32(data: &mut [u8], offset: usize, value: u32) {
        data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }
}
