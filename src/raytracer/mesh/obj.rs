//! Minimal Wavefront OBJ reader: vertex positions and polygon faces only.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;

use super::{MeshData, MeshError};

/// Load an OBJ file as local-space mesh data
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData, MeshError> {
    let file = File::open(path)?;
    parse_obj(BufReader::new(file))
}

fn parse_obj<R: BufRead>(reader: R) -> Result<MeshData, MeshError> {
    let mut data = MeshData::default();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" => {
                if parts.len() < 4 {
                    return Err(parse_error(number, "vertex needs three coordinates"));
                }
                let mut coords = [0.0f32; 3];
                for (slot, text) in coords.iter_mut().zip(&parts[1..4]) {
                    *slot = text
                        .parse()
                        .map_err(|_| parse_error(number, &format!("invalid coordinate '{text}'")))?;
                }
                data.vertices.push(Point3::from(coords));
            }
            "f" => {
                if parts.len() < 4 {
                    return Err(parse_error(number, "face needs at least three vertices"));
                }
                let indices = parts[1..]
                    .iter()
                    .map(|token| face_index(token, data.vertices.len(), number))
                    .collect::<Result<Vec<_>, _>>()?;
                data.push_polygon(&indices);
            }
            // normals, texture coordinates, groups and materials are ignored
            _ => {}
        }
    }
    data.validate()?;
    Ok(data)
}

/// Resolves a face token such as `7`, `7/2/3` or `-1` to a zero-based index.
fn face_index(token: &str, vertex_count: usize, line: usize) -> Result<usize, MeshError> {
    let position = token.split('/').next().unwrap_or(token);
    let index: i64 = position
        .parse()
        .map_err(|_| parse_error(line, &format!("invalid face index '{token}'")))?;
    let resolved = match index {
        0 => return Err(parse_error(line, "face index 0 is invalid")),
        i if i > 0 => (i - 1) as usize,
        i => {
            let back = i.unsigned_abs() as usize;
            if back > vertex_count {
                return Err(parse_error(line, &format!("relative index {i} out of range")));
            }
            vertex_count - back
        }
    };
    Ok(resolved)
}

fn parse_error(line: usize, message: &str) -> MeshError {
    MeshError::Parse {
        line: line + 1,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD: &str = "\
# a unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_parse_quad_triangulates() {
        let data = parse_obj(Cursor::new(QUAD)).unwrap();
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_relative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let data = parse_obj(Cursor::new(text)).unwrap();
        assert_eq!(data.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_bad_coordinate_reports_line() {
        let text = "v 0 0 0\nv 1 x 0\n";
        match parse_obj(Cursor::new(text)) {
            Err(MeshError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_face() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(matches!(
            parse_obj(Cursor::new(text)),
            Err(MeshError::IndexOutOfRange { index: 8, count: 3 })
        ));
    }

    #[test]
    fn test_no_faces_is_empty() {
        assert!(matches!(
            parse_obj(Cursor::new("v 0 0 0\n")),
            Err(MeshError::Empty)
        ));
    }
}
