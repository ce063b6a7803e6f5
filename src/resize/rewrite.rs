use crate::errors::RelayoutError;
use crate::layout::Partition;

// Field index of <size_bytes> in a part record:
// part <disk_device> <size_bytes> <start_bytes> ...
const SIZE_FIELD: usize = 2;

/// Replaces the size field of one partition record in the working
/// copy of the layout description, leaving every other character of
/// the text untouched.
///
/// The partition's verbatim source line must still be present in the
/// working copy. If it is not, the model and the text have diverged,
/// which is a consistency bug and fails the run loudly.
pub fn apply(
    working: &str,
    part: &Partition,
    new_size: u64,
) -> Result<String, RelayoutError> {
    let new_line = replace_size_field(&part.line, new_size)?;

    // Replace by whole-line identity, not by substring: a commented
    // copy of the record, or a longer line containing it, must never
    // be touched
    let mut updated = String::with_capacity(working.len());
    let mut replaced = false;

    for piece in working.split_inclusive('\n') {
        let (line, terminator) = split_terminator(piece);

        if replaced || line != part.line {
            updated.push_str(piece);

            continue;
        }

        updated.push_str(&new_line);
        updated.push_str(terminator);
        replaced = true;
    }

    if !replaced {
        return Err(RelayoutError::BadLayout(format!(
            "partition record for {} not found in layout text: {}",
            part.device, part.line,
        )));
    }

    Ok(updated)
}

/// Splits one piece of `split_inclusive('\n')` output into the line
/// as `str::lines` would yield it plus its verbatim terminator
fn split_terminator(piece: &str) -> (&str, &str) {
    match piece.strip_suffix("\r\n") {
        Some(line) => (line, "\r\n"),
        None => match piece.strip_suffix('\n') {
            Some(line) => (line, "\n"),
            None => (piece, ""),
        },
    }
}

/// Swaps the size field of a part record for `new_size`,
/// preserving all other fields and whitespace byte-for-byte.
fn replace_size_field(
    line: &str,
    new_size: u64,
) -> Result<String, RelayoutError> {
    let (start, end) = field_span(line, SIZE_FIELD).ok_or_else(|| {
        RelayoutError::BadLayout(format!(
            "partition record has no size field: {line}"
        ))
    })?;

    Ok(format!("{}{}{}", &line[..start], new_size, &line[end..]))
}

/// Byte span of the `index`-th whitespace-delimited field
fn field_span(line: &str, index: usize) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut pos = 0;
    let mut field = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if pos == bytes.len() {
            break;
        }

        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if field == index {
            return Some((start, pos));
        }

        field += 1;
    }

    None
}
