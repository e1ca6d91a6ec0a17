use super::error::{Error, Result};
use std::io::Read;
use std::str::FromStr;

/// An immutable program image. Each process works on its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub data: Box<[i64]>,
}

impl Program {
    pub fn parse(mut input: impl Read) -> Result<Self> {
        let mut data_string = String::new();
        input.read_to_string(&mut data_string)?;
        data_string.parse()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromStr for Program {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let data = s
            .trim()
            .split(',')
            .map(str::trim)
            .map(i64::from_str)
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_boxed_slice();
        Ok(Program { data })
    }
}

impl From<Vec<i64>> for Program {
    fn from(data: Vec<i64>) -> Self {
        Program {
            data: data.into_boxed_slice(),
        }
    }
}
