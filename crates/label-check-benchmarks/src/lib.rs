//! Deterministic fixtures for pipeline smoke benchmarks.

use label_check_capture::LabelFile;

/// Builds an in-memory JPEG-typed file of `len` pseudo-random bytes.
pub fn synthetic_label(len: usize) -> LabelFile {
    let mut state: u32 = 0x2545_f491;
    let bytes: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    LabelFile::from_bytes("synthetic.jpg", "image/jpeg", bytes)
}
