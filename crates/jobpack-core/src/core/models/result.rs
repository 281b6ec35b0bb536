use crate::core::io::codec::{self, LEN_PREFIX};
use crate::core::io::traits::{WireDecode, WireEncode};
use crate::engine::error::Result;
use std::io::{Read, Write};

/// The numeric payload a worker returns after running a job.
///
/// An empty result is the valid "nothing reported yet" state. Cloning always
/// allocates fresh storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobResult {
    /// Number of the job this result answers.
    pub job_number: i32,
    data: Vec<f32>,
}

impl JobResult {
    pub fn new(job_number: i32, data: &[f32]) -> Self {
        Self {
            job_number,
            data: data.to_vec(),
        }
    }

    pub fn empty(job_number: i32) -> Self {
        Self {
            job_number,
            data: Vec::new(),
        }
    }

    /// Replaces the payload with a copy of `data`, dropping the old buffer.
    pub fn set_result(&mut self, data: &[f32]) {
        self.data = data.to_vec();
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<(i32, Vec<f32>)> for JobResult {
    fn from((job_number, data): (i32, Vec<f32>)) -> Self {
        Self { job_number, data }
    }
}

impl WireEncode for JobResult {
    fn encoded_size(&self) -> usize {
        4 + LEN_PREFIX + 4 * self.data.len()
    }

    fn write_body(&self, writer: &mut impl Write) -> Result<()> {
        codec::write_i32(writer, self.job_number)?;
        codec::write_len(writer, self.data.len())?;
        for value in &self.data {
            codec::write_f32(writer, *value)?;
        }
        Ok(())
    }
}

impl WireDecode for JobResult {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let job_number = codec::read_i32(reader)?;
        let len = codec::read_len(reader)?;
        let mut data = Vec::new();
        for _ in 0..len {
            data.push(codec::read_f32(reader)?);
        }
        Ok(Self { job_number, data })
    }
}
