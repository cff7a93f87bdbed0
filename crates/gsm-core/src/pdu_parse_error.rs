#[derive(Debug, PartialEq, Eq)]
pub enum PduParseErr {
    BufferEnded { field: Option<&'static str> },
    InconsistentLength { expected: usize, found: usize },
}

impl core::fmt::Display for PduParseErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PduParseErr::BufferEnded { field } => write!(f, "buffer ended reading {}", field.unwrap_or("?")),
            PduParseErr::InconsistentLength { expected, found } => {
                write!(f, "inconsistent length: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for PduParseErr {}

/// Reads one byte at `$idx` from `$buf` into `$ident`, or returns PduParseErr::BufferEnded
#[macro_export]
macro_rules! let_byte {
    ($buf:expr, $idx:expr, $ident:ident) => {
        let $ident = *$buf.get($idx).ok_or(PduParseErr::BufferEnded { field: Some(stringify!($ident)) })?;
    };
}
