use std::{fmt, io::Read};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use xz2::read::XzDecoder;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Number of leading bytes needed by [`Compression::detect`].
pub const SIGNATURE_LEN: usize = 6;

/// Compression layer wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Identifies the compression from the leading bytes of a file.
    ///
    /// Anything without a known signature is treated as an uncompressed stream.
    pub fn detect(signature: &[u8]) -> Self {
        if signature.starts_with(GZIP_MAGIC) {
            Self::Gzip
        } else if signature.starts_with(BZIP2_MAGIC) {
            Self::Bzip2
        } else if signature.starts_with(XZ_MAGIC) {
            Self::Xz
        } else if signature.starts_with(ZSTD_MAGIC) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Wraps `reader` in the matching decoder.
    pub fn decoder<'a, R>(self, reader: R) -> std::io::Result<Box<dyn Read + 'a>>
    where
        R: Read + 'a,
    {
        Ok(match self {
            Self::None => Box::new(reader),
            Self::Gzip => Box::new(MultiGzDecoder::new(reader)),
            Self::Bzip2 => Box::new(MultiBzDecoder::new(reader)),
            Self::Xz => Box::new(XzDecoder::new_multi_decoder(reader)),
            Self::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        };
        write!(f, "{name}")
    }
}
