//! CSV/JSON reading and writing for documents and records.

use anyhow::Context;
use serde::Serialize;
use std::io::{Read, Write};

use methex_extract::{Document, StructuredRecord};

/// Read `document_id`/`pmid` + `text` rows. Other columns are ignored.
pub fn read_documents<R: Read>(reader: R) -> anyhow::Result<Vec<Document>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut documents = Vec::new();
    for (row, result) in rdr.deserialize::<Document>().enumerate() {
        let document = result.with_context(|| format!("malformed document row {}", row + 1))?;
        documents.push(document);
    }
    Ok(documents)
}

/// Read records previously written by [`write_records_csv`].
pub fn read_records<R: Read>(reader: R) -> anyhow::Result<Vec<StructuredRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (row, result) in rdr.deserialize::<StructuredRecord>().enumerate() {
        records.push(result.with_context(|| format!("malformed record row {}", row + 1))?);
    }
    Ok(records)
}

pub fn write_records_csv<W: Write>(writer: W, records: &[StructuredRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}
