//! Formatting utilities

use glam::{Mat4, Vec3};

/// Format a vector as `(x, y, z)` with fixed precision
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

/// Format a matrix as four row-major lines
pub fn format_matrix(m: &Mat4, indent: &str) -> String {
    let rows = m.transpose().to_cols_array_2d();
    rows.iter()
        .map(|row| {
            format!(
                "{indent}[{:>9.4} {:>9.4} {:>9.4} {:>9.4}]",
                row[0], row[1], row[2], row[3]
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration given in seconds
pub fn format_seconds(seconds: f32) -> String {
    if seconds < 1.0 {
        format!("{:.0} ms", seconds * 1000.0)
    } else {
        format!("{seconds:.2} s")
    }
}
