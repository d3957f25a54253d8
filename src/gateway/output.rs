use serde_json::Value;

/// Prefix of the `status` field that marks a successful solve.
pub const SUCCESS_MARKER: &str = "success";

/// A solver output document with a recognizable `status` field.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub status: String,
    pub message: Option<String>,
    pub document: Value,
}

impl SolverOutput {
    pub fn is_success(&self) -> bool {
        self.status.starts_with(SUCCESS_MARKER)
    }
}

/// Parse the raw contents of an output file.
///
/// The error is a diagnostic that carries at most `excerpt_chars` characters
/// of the raw content.
pub fn parse_output(raw: &str, excerpt_chars: usize) -> Result<SolverOutput, String> {
    let document: Value = serde_json::from_str(raw).map_err(|e| {
        format!(
            "solver output is not valid JSON ({e}); content: {}",
            excerpt(raw, excerpt_chars)
        )
    })?;

    let Some(status) = document.get("status").and_then(Value::as_str) else {
        return Err(format!(
            "solver output has no string `status` field; content: {}",
            excerpt(raw, excerpt_chars)
        ));
    };

    Ok(SolverOutput {
        status: status.to_string(),
        message: document
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        document,
    })
}

/// First `max_chars` characters of `raw`, marked when cut short.
pub fn excerpt(raw: &str, max_chars: usize) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
