//! Binary persistence of convergence curves.
//!
//! Layout, all integers and floats little-endian:
//!
//! ```text
//! magic   [0x93, b'C', b'O', b'N', b'V']
//! version u8 (= 1)
//! count   u64                  number of arrays
//! count × (len u64, len × f64)
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvergenceError, Result};
use crate::series::ConvergenceCurve;

pub const ARTIFACT_MAGIC: [u8; 5] = [0x93, b'C', b'O', b'N', b'V'];
pub const ARTIFACT_VERSION: u8 = 1;
/// Directory, relative to the working directory, that receives result files.
pub const OUTPUT_DIR: &str = "../output/bin";
pub const ARTIFACT_EXTENSION: &str = "bin";

/// Location of the artifact for run `name`.
pub fn artifact_path(name: &str) -> PathBuf {
    Path::new(OUTPUT_DIR).join(format!("{name}.{ARTIFACT_EXTENSION}"))
}

/// Serializes any number of `f64` arrays.
pub fn encode_arrays(arrays: &[&[f64]]) -> Vec<u8> {
    let payload: usize = arrays.iter().map(|array| 8 + 8 * array.len()).sum();
    let mut buffer = Vec::with_capacity(ARTIFACT_MAGIC.len() + 1 + 8 + payload);
    buffer.extend_from_slice(&ARTIFACT_MAGIC);
    buffer.push(ARTIFACT_VERSION);
    buffer.extend_from_slice(&(arrays.len() as u64).to_le_bytes());
    for array in arrays {
        buffer.extend_from_slice(&(array.len() as u64).to_le_bytes());
        for value in array.iter() {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }
    buffer
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bytes.len() < n {
            return Err(ConvergenceError::CorruptArtifact {
                reason: "payload ends early",
            });
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn word(&mut self) -> Result<[u8; 8]> {
        let mut word = [0u8; 8];
        word.copy_from_slice(self.take(8)?);
        Ok(word)
    }

    fn length(&mut self) -> Result<usize> {
        usize::try_from(u64::from_le_bytes(self.word()?)).map_err(|_| {
            ConvergenceError::CorruptArtifact {
                reason: "length does not fit in memory",
            }
        })
    }
}

/// Parses arrays written by [`encode_arrays`].
pub fn decode_arrays(bytes: &[u8]) -> Result<Vec<Vec<f64>>> {
    let mut reader = Reader { bytes };
    if reader.take(ARTIFACT_MAGIC.len())? != &ARTIFACT_MAGIC[..] {
        return Err(ConvergenceError::CorruptArtifact {
            reason: "magic prefix mismatch",
        });
    }
    if reader.take(1)?[0] != ARTIFACT_VERSION {
        return Err(ConvergenceError::CorruptArtifact {
            reason: "unsupported version",
        });
    }

    let count = reader.length()?;
    let mut arrays = Vec::new();
    for _ in 0..count {
        let len = reader.length()?;
        if len > reader.bytes.len() / 8 {
            return Err(ConvergenceError::CorruptArtifact {
                reason: "payload ends early",
            });
        }
        let mut array = Vec::with_capacity(len);
        for _ in 0..len {
            array.push(f64::from_le_bytes(reader.word()?));
        }
        arrays.push(array);
    }
    if !reader.bytes.is_empty() {
        return Err(ConvergenceError::CorruptArtifact {
            reason: "trailing bytes",
        });
    }
    Ok(arrays)
}

/// Writes the step sizes and errors of `curve` to `path`, creating parent
/// directories as needed.
pub fn write_curve(path: &Path, curve: &ConvergenceCurve) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = encode_arrays(&[curve.step_sizes(), curve.errors()]);
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Reads a curve written by [`write_curve`].
pub fn read_curve(path: &Path) -> Result<ConvergenceCurve> {
    let bytes = fs::read(path)?;
    let mut arrays = decode_arrays(&bytes)?.into_iter();
    match (arrays.next(), arrays.next(), arrays.next()) {
        (Some(step_sizes), Some(errors), None) => ConvergenceCurve::new(step_sizes, errors),
        _ => Err(ConvergenceError::CorruptArtifact {
            reason: "expected exactly two arrays",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_path_appends_extension() {
        assert_eq!(
            artifact_path("ode_lin"),
            PathBuf::from("../output/bin/ode_lin.bin")
        );
    }

    #[test]
    fn decodes_what_it_encodes_bit_for_bit() {
        let first = [0.01, f64::MIN_POSITIVE, -0.0, 1.0 / 3.0];
        let second = [f64::MAX, 2.5e-300, 7.0, f64::EPSILON];
        let decoded = decode_arrays(&encode_arrays(&[&first[..], &second[..]])).unwrap();
        assert_eq!(decoded.len(), 2);
        for (original, restored) in [&first[..], &second[..]].iter().zip(&decoded) {
            let original: Vec<u64> = original.iter().map(|v| v.to_bits()).collect();
            let restored: Vec<u64> = restored.iter().map(|v| v.to_bits()).collect();
            assert_eq!(original, restored);
        }
    }

    #[test]
    fn rejects_truncated_payload() {
        let bytes = encode_arrays(&[&[1.0, 2.0][..]]);
        let result = decode_arrays(&bytes[..bytes.len() - 3]);
        assert!(matches!(
            result,
            Err(ConvergenceError::CorruptArtifact { .. })
        ));
    }

    #[test]
    fn rejects_foreign_magic() {
        let mut bytes = encode_arrays(&[&[1.0][..]]);
        bytes[1] = b'X';
        assert!(matches!(
            decode_arrays(&bytes),
            Err(ConvergenceError::CorruptArtifact {
                reason: "magic prefix mismatch"
            })
        ));
    }

    #[test]
    fn curve_files_round_trip() {
        let dir = std::env::temp_dir().join(format!("dense-convergence-{}", std::process::id()));
        let path = dir.join("nested").join("curve.bin");
        let curve = ConvergenceCurve::new(vec![0.01, 0.1, 1.0], vec![1e-9, 1e-5, 0.3]).unwrap();

        write_curve(&path, &curve).unwrap();
        let restored = read_curve(&path).unwrap();
        assert_eq!(restored, curve);

        fs::remove_dir_all(&dir).unwrap();
    }
}
