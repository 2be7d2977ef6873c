//! Startup ingestion of the policy document directory.

use std::path::Path;

use tracing::{info, warn};
use wfi_rag::{Document, RagError, Retriever};

/// Load every `.txt` and `.md` file in `dir` as a [`Document`].
///
/// The file stem becomes the document id and the file name is stored as
/// `source` metadata for citations. A missing directory is an error;
/// unreadable individual files are skipped with a warning.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, RagError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        RagError::Pipeline(format!("cannot read document directory {}: {e}", dir.display()))
    })?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| RagError::Pipeline(format!("cannot list {}: {e}", dir.display())))?;
        let path = entry.path();
        let is_doc = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("md")
        );
        if !is_doc {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let file_name = entry.file_name().to_string_lossy().into_owned();

        match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => {
                warn!(file = %file_name, "skipping empty document");
            }
            Ok(text) => {
                let mut document = Document::new(stem, text);
                document.metadata.insert("source".to_string(), file_name);
                documents.push(document);
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "skipping unreadable document");
            }
        }
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(documents)
}

/// Ingest the document directory into the retriever's index.
///
/// Returns the number of chunks indexed.
pub async fn ingest_dir(retriever: &Retriever, dir: &Path) -> Result<usize, RagError> {
    let documents = load_documents(dir)?;
    if documents.is_empty() {
        warn!(dir = %dir.display(), "no documents found to ingest");
        return Ok(0);
    }

    let chunks = retriever.index_batch(&documents).await?;
    info!(documents = documents.len(), chunks = chunks.len(), "ingestion complete");
    Ok(chunks.len())
}
