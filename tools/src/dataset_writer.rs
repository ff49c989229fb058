use bitboard::{Dataset, FeatureVector, NUM_FEATURES};
use npyz::WriterBuilder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `win_data.npy.zst` and `loss_data.npy.zst` into `dir`.
/// Each file is a zstd compressed NumPy array of shape (n, 773) and dtype u8 (0 or 1)
pub fn write_dataset(dir: &Path, dataset: &Dataset, level: i32) -> io::Result<Vec<PathBuf>> {
    let mut written = vec![];

    for (name, vectors) in [("win_data", &dataset.win), ("loss_data", &dataset.loss)] {
        let path = dir.join(format!("{}.npy.zst", name));
        let file = BufWriter::new(File::create(&path)?);
        write_array(file, vectors, level)?.flush()?;
        written.push(path);
    }

    Ok(written)
}

/// Writes one compressed array, returns the inner writer once the stream is complete
pub fn write_array<W: Write>(write: W, vectors: &[FeatureVector], level: i32) -> io::Result<W> {
    let mut encoder = zstd::Encoder::new(write, level)?;

    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&[vectors.len() as u64, NUM_FEATURES as u64])
        .writer(&mut encoder)
        .begin_nd()?;

    for vector in vectors {
        writer.extend(vector.to_bytes())?;
    }
    writer.finish()?;

    encoder.finish()
}
