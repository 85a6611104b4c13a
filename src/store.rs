//! Persisted-network file format.
//!
//! A saved network is a single text record with `!`-delimited fields:
//!
//! ```text
//! generation ! score ! w ! weight_matrix_0 ! ... ! b ! bias_vector_0 ! ...
//! ```
//!
//! Each matrix and bias vector is a nested numeric-array literal (rows of
//! floats); bias vectors are single-row literals. The weights section ends
//! at the literal token `b`; the biases section ends at end-of-input or at a
//! reserved token beginning with `#` (never emitted). A save overwrites the
//! target with exactly one record. A malformed file is a fatal load error,
//! never a silent partial load.

use crate::neural::{Layer, Network};
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One decoded record: the fittest genome plus its generation counter.
/// The saved score rides on `network.score`.
#[derive(Debug, Clone)]
pub struct SavedNetwork {
    pub generation: u64,
    pub network: Network,
}

/// Errors raised while saving or loading a network record
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    /// A field failed to parse as the expected literal
    Parse(String),
    /// The `w` marker that opens the weights section is missing
    MissingWeightMarker,
    /// The `b` marker that opens the biases section is missing
    MissingBiasMarker,
    /// Decoded matrices do not chain into a valid layer stack
    ShapeMismatch(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
            Self::MissingWeightMarker => write!(f, "missing 'w' section marker"),
            Self::MissingBiasMarker => write!(f, "missing 'b' section marker"),
            Self::ShapeMismatch(msg) => write!(f, "shape mismatch: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Save one network record, overwriting the target
pub fn save<P: AsRef<Path>>(path: P, generation: u64, network: &Network) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut fields: Vec<String> = Vec::with_capacity(3 + 2 * network.layers.len());
    fields.push(generation.to_string());
    fields.push(network.score.to_string());
    fields.push("w".to_string());
    for layer in &network.layers {
        fields.push(encode_matrix(&layer.weights));
    }
    fields.push("b".to_string());
    for layer in &network.layers {
        fields.push(encode_row(&layer.biases));
    }

    writer.write_all(fields.join("!").as_bytes())?;
    Ok(())
}

/// Load one network record
pub fn load<P: AsRef<Path>>(path: P) -> Result<SavedNetwork, StoreError> {
    let text = std::fs::read_to_string(path)?;
    decode(&text)
}

/// Decode a record from its text form
pub fn decode(text: &str) -> Result<SavedNetwork, StoreError> {
    let mut fields = text.split('!').map(str::trim);

    let generation = fields
        .next()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| StoreError::Parse("empty record".to_string()))?
        .parse::<u64>()
        .map_err(|e| StoreError::Parse(format!("bad generation field: {}", e)))?;

    let score = fields
        .next()
        .ok_or_else(|| StoreError::Parse("record ends before score".to_string()))?
        .parse::<f32>()
        .map_err(|e| StoreError::Parse(format!("bad score field: {}", e)))?;

    match fields.next() {
        Some("w") => {}
        _ => return Err(StoreError::MissingWeightMarker),
    }

    // Weight matrices run until the `b` marker
    let mut weights = Vec::new();
    let mut saw_bias_marker = false;
    for field in fields.by_ref() {
        if field == "b" {
            saw_bias_marker = true;
            break;
        }
        weights.push(parse_matrix(field)?);
    }
    if !saw_bias_marker {
        return Err(StoreError::MissingBiasMarker);
    }

    // Bias vectors run to end-of-input or a reserved `#` token
    let mut biases = Vec::new();
    for field in fields {
        if field.starts_with('#') {
            break;
        }
        let rows = parse_matrix(field)?;
        if rows.len() != 1 {
            return Err(StoreError::ShapeMismatch(format!(
                "bias literal must be a single row, found {} rows",
                rows.len()
            )));
        }
        biases.push(rows.into_iter().next().unwrap());
    }

    build_network(generation, score, weights, biases)
}

/// Assemble and validate the layer stack
fn build_network(
    generation: u64,
    score: f32,
    weights: Vec<Vec<Vec<f32>>>,
    biases: Vec<Vec<f32>>,
) -> Result<SavedNetwork, StoreError> {
    if weights.is_empty() {
        return Err(StoreError::ShapeMismatch("no weight matrices".to_string()));
    }
    if weights.len() != biases.len() {
        return Err(StoreError::ShapeMismatch(format!(
            "{} weight matrices but {} bias vectors",
            weights.len(),
            biases.len()
        )));
    }

    let mut layers: Vec<Layer> = Vec::with_capacity(weights.len());
    for (idx, (matrix, bias)) in weights.into_iter().zip(biases).enumerate() {
        let rows = matrix.len();
        let cols = matrix[0].len();

        if matrix.iter().any(|row| row.len() != cols) {
            return Err(StoreError::ShapeMismatch(format!(
                "ragged rows in weight matrix {}",
                idx
            )));
        }
        if bias.len() != cols {
            return Err(StoreError::ShapeMismatch(format!(
                "layer {}: {} columns but {} biases",
                idx,
                cols,
                bias.len()
            )));
        }
        if let Some(prev) = layers.last() {
            if prev.weights.ncols() != rows {
                return Err(StoreError::ShapeMismatch(format!(
                    "layer {} expects {} inputs, previous layer emits {}",
                    idx,
                    rows,
                    prev.weights.ncols()
                )));
            }
        }

        let flat: Vec<f32> = matrix.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| StoreError::ShapeMismatch(e.to_string()))?;
        layers.push(Layer {
            weights,
            biases: Array1::from_vec(bias),
        });
    }

    let network = Network {
        n_inputs: layers[0].weights.nrows(),
        n_outputs: layers[layers.len() - 1].weights.ncols(),
        layers,
        score,
    };

    Ok(SavedNetwork {
        generation,
        network,
    })
}

/// Encode a matrix as a nested array literal, one inner array per row
fn encode_matrix(matrix: &Array2<f32>) -> String {
    let rows: Vec<String> = matrix
        .rows()
        .into_iter()
        .map(|row| {
            let elems: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            format!("[{}]", elems.join(", "))
        })
        .collect();
    format!("[{}]", rows.join(", "))
}

/// Encode a vector as a single-row nested literal
fn encode_row(vector: &Array1<f32>) -> String {
    let elems: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
    format!("[[{}]]", elems.join(", "))
}

/// Parse a nested numeric-array literal into rows of floats
fn parse_matrix(field: &str) -> Result<Vec<Vec<f32>>, StoreError> {
    let inner = field
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| StoreError::Parse(format!("expected a [..] literal, found '{}'", field)))?;

    let mut rows = Vec::new();
    let mut rest = inner.trim();
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(StoreError::Parse(format!(
                "expected a row literal, found '{}'",
                rest
            )));
        }
        let end = rest
            .find(']')
            .ok_or_else(|| StoreError::Parse("unterminated row literal".to_string()))?;

        let row = rest[1..end]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<f32>()
                    .map_err(|e| StoreError::Parse(format!("bad float '{}': {}", p, e)))
            })
            .collect::<Result<Vec<f32>, StoreError>>()?;
        if row.is_empty() {
            return Err(StoreError::Parse("empty row literal".to_string()));
        }
        rows.push(row);

        rest = rest[end + 1..].trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }

    if rows.is_empty() {
        return Err(StoreError::Parse("empty matrix literal".to_string()));
    }
    Ok(rows)
}
