//! Instance file reader.
//!
//! Format:
//!
//! ```text
//! <N> <E> <L>
//! <size of layer 1> ... <size of layer L>
//! <origin id> <destination id>      (E lines, 1-based ids)
//! ```
//!
//! Any deviation is fatal: there is no partial recovery.

use std::path::Path;

use super::InstanceData;
use crate::error::{MmacError, Result};

/// Reads and parses an instance file.
pub fn read_instance(path: impl AsRef<Path>) -> Result<InstanceData> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MmacError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_instance(&text)
}

/// Parses instance text.
pub fn parse_instance(text: &str) -> Result<InstanceData> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line_no, header) = lines.next().ok_or(MmacError::Parse {
        line: 1,
        message: "missing header line".into(),
    })?;
    let header = parse_numbers(header, line_no)?;
    let [num_nodes, num_edges, num_layers] = header[..] else {
        return Err(MmacError::Parse {
            line: line_no,
            message: format!("expected \"<N> <E> <L>\", found {} values", header.len()),
        });
    };

    let (line_no, sizes) = lines.next().ok_or(MmacError::Parse {
        line: line_no + 1,
        message: "missing layer sizes line".into(),
    })?;
    let layer_sizes = parse_numbers(sizes, line_no)?;
    if layer_sizes.len() != num_layers {
        return Err(MmacError::CountMismatch {
            what: "layers",
            expected: num_layers,
            found: layer_sizes.len(),
        });
    }
    let total: usize = layer_sizes.iter().sum();
    if total != num_nodes {
        return Err(MmacError::CountMismatch {
            what: "nodes",
            expected: num_nodes,
            found: total,
        });
    }

    let mut edges = Vec::with_capacity(num_edges);
    for (line_no, line) in lines {
        let pair = parse_numbers(line, line_no)?;
        let [origin, destination] = pair[..] else {
            return Err(MmacError::Parse {
                line: line_no,
                message: format!(
                    "expected \"<origin> <destination>\", found {} values",
                    pair.len()
                ),
            });
        };
        edges.push((origin, destination));
    }
    if edges.len() != num_edges {
        return Err(MmacError::CountMismatch {
            what: "edges",
            expected: num_edges,
            found: edges.len(),
        });
    }

    InstanceData::new(layer_sizes, &edges)
}

fn parse_numbers(line: &str, line_no: usize) -> Result<Vec<usize>> {
    line.split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|_| MmacError::Parse {
                line: line_no,
                message: format!("invalid number {token:?}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "4 2 2\n2 2\n1 4\n2 3\n";

    #[test]
    fn test_parse_small_instance() {
        let inst = parse_instance(SMALL).unwrap();
        assert_eq!(inst.num_nodes(), 4);
        assert_eq!(inst.num_edges(), 2);
        assert_eq!(inst.layer_sizes(), &[2, 2]);
        assert_eq!(inst.edge(0).origin, 0);
        assert_eq!(inst.edge(0).destination, 3);
    }

    #[test]
    fn test_trailing_blank_lines_and_crlf() {
        let inst = parse_instance("4 2 2\r\n2 2\r\n1 4\r\n2 3\r\n\r\n\n").unwrap();
        assert_eq!(inst.num_edges(), 2);
    }

    #[test]
    fn test_bad_header() {
        let err = parse_instance("4 2\n2 2\n").unwrap_err();
        assert!(matches!(err, MmacError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_layer_sum_mismatch() {
        let err = parse_instance("5 0 2\n2 2\n").unwrap_err();
        assert!(matches!(
            err,
            MmacError::CountMismatch {
                what: "nodes",
                expected: 5,
                found: 4
            }
        ));
    }

    #[test]
    fn test_layer_count_mismatch() {
        let err = parse_instance("4 0 3\n2 2\n").unwrap_err();
        assert!(matches!(err, MmacError::CountMismatch { what: "layers", .. }));
    }

    #[test]
    fn test_missing_edges() {
        let err = parse_instance("4 3 2\n2 2\n1 3\n2 4\n").unwrap_err();
        assert!(matches!(
            err,
            MmacError::CountMismatch {
                what: "edges",
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_garbage_token() {
        let err = parse_instance("4 1 2\n2 2\n1 x\n").unwrap_err();
        assert!(matches!(err, MmacError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_instance("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, MmacError::Io { .. }));
    }
}
