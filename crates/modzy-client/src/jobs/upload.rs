use super::api::JobApi;
use super::chunks::{ChunkSource, InputSource};
use super::error::JobError;

/// What to send for an input item without any content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyInputPolicy {
    /// Send nothing for the item.
    #[default]
    Skip,
    /// Send a single zero-byte chunk so the service learns the item exists.
    SendEmptyChunk,
}

/// One slot of a job with its named items, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSlot {
    key: String,
    items: Vec<(String, InputSource)>,
}

impl InputSlot {
    fn new(key: String) -> Self {
        Self {
            key,
            items: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &InputSource)> {
        self.items
            .iter()
            .map(|(key, source)| (key.as_str(), source))
    }

    pub fn get(&self, item_key: &str) -> Option<&InputSource> {
        self.items
            .iter()
            .find(|(key, _)| key == item_key)
            .map(|(_, source)| source)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert(&mut self, item_key: String, source: InputSource) {
        match self.items.iter_mut().find(|(key, _)| *key == item_key) {
            Some((_, existing)) => *existing = source,
            None => self.items.push((item_key, source)),
        }
    }
}

/// Inputs of a file job, keyed by slot then by item.
///
/// Slots and items are uploaded in the order they were first inserted. Inserting an existing
/// key again replaces its source without moving it.
///
/// ```
/// use modzy_client::jobs::{InputSource, JobInputs};
///
/// let inputs = JobInputs::new()
///     .with_item("first", "input.txt", "Modzy is great")
///     .with_item("second", "image", InputSource::file("cat.png"));
/// assert_eq!(inputs.item_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobInputs {
    slots: Vec<InputSlot>,
}

impl JobInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(
        mut self,
        slot_key: impl Into<String>,
        item_key: impl Into<String>,
        source: impl Into<InputSource>,
    ) -> Self {
        self.insert(slot_key, item_key, source);
        self
    }

    pub fn insert(
        &mut self,
        slot_key: impl Into<String>,
        item_key: impl Into<String>,
        source: impl Into<InputSource>,
    ) {
        let slot_key = slot_key.into();
        let index = match self.slots.iter().position(|slot| slot.key == slot_key) {
            Some(index) => index,
            None => {
                self.slots.push(InputSlot::new(slot_key));
                self.slots.len() - 1
            }
        };
        self.slots[index].insert(item_key.into(), source.into());
    }

    pub fn slots(&self) -> impl Iterator<Item = &InputSlot> {
        self.slots.iter()
    }

    pub fn slot(&self, slot_key: &str) -> Option<&InputSlot> {
        self.slots.iter().find(|slot| slot.key == slot_key)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(InputSlot::is_empty)
    }

    pub fn item_count(&self) -> usize {
        self.slots.iter().map(InputSlot::len).sum()
    }
}

/// Totals of a finished upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub items: usize,
    pub chunks: usize,
    pub bytes: u64,
}

/// Upload every item of `inputs` to an open job, one chunk at a time.
///
/// Each chunk is acknowledged before the next one is read. The first failure stops the whole
/// upload and is returned as is; nothing is retried.
pub async fn upload_all_inputs<A: JobApi + ?Sized>(
    api: &A,
    job_identifier: &str,
    inputs: &JobInputs,
    max_chunk_size: usize,
    policy: EmptyInputPolicy,
) -> Result<UploadSummary, JobError> {
    let mut summary = UploadSummary::default();

    for slot in inputs.slots() {
        for (item_key, source) in slot.items() {
            let (chunks, bytes) = upload_item(
                api,
                job_identifier,
                slot.key(),
                item_key,
                source,
                max_chunk_size,
                policy,
            )
            .await?;

            summary.items += 1;
            summary.chunks += chunks;
            summary.bytes += bytes;
        }
    }

    Ok(summary)
}

async fn upload_item<A: JobApi + ?Sized>(
    api: &A,
    job_identifier: &str,
    slot_key: &str,
    item_key: &str,
    source: &InputSource,
    max_chunk_size: usize,
    policy: EmptyInputPolicy,
) -> Result<(usize, u64), JobError> {
    let mut chunks = ChunkSource::new(source, max_chunk_size)?;
    let mut sent = 0;
    let mut bytes = 0u64;

    while let Some(chunk) = chunks.next_chunk().await? {
        let len = chunk.len();
        send_chunk(api, job_identifier, slot_key, item_key, sent + 1, chunk).await?;
        sent += 1;
        bytes += len as u64;
    }

    if sent == 0 {
        match policy {
            EmptyInputPolicy::Skip => {
                log::debug!("Input {slot_key}/{item_key} is empty, nothing to upload");
            }
            EmptyInputPolicy::SendEmptyChunk => {
                send_chunk(api, job_identifier, slot_key, item_key, 1, Vec::new()).await?;
                sent = 1;
            }
        }
    }

    log::info!(
        "Uploaded input {slot_key}/{item_key} of job {job_identifier}: \
         {sent} chunk(s), {bytes} bytes"
    );
    Ok((sent, bytes))
}

async fn send_chunk<A: JobApi + ?Sized>(
    api: &A,
    job_identifier: &str,
    slot_key: &str,
    item_key: &str,
    position: usize,
    chunk: Vec<u8>,
) -> Result<(), JobError> {
    let len = chunk.len();
    api.append_input_chunk(job_identifier, slot_key, item_key, chunk)
        .await
        .map_err(|source| JobError::ChunkUpload {
            job_identifier: job_identifier.to_string(),
            slot: slot_key.to_string(),
            item: item_key.to_string(),
            chunk: position,
            source,
        })?;
    log::debug!("Sent chunk {position} ({len} bytes) of {slot_key}/{item_key}");
    Ok(())
}
