/// Calculates the 1-based line and column number for a given byte offset in the source text.
/// Only called when something is reported, as it scans the source up to the offset.
pub fn get_line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
