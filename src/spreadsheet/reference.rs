//! Conversions between Excel-style references (`B7`) and 0-based indexes.

/// Converts a 0-based column index to letters: 0 → `A`, 26 → `AA`.
pub(crate) fn col_to_letters(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = Vec::<u8>::new();
    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Converts 0-based (row, col) to a reference such as `C12`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}

/// Converts column letters to a 0-based index. Empty or non-letter input yields `None`.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0usize, |index, byte| {
        if byte.is_ascii_alphabetic() {
            let digit = (byte.to_ascii_uppercase() - b'A') as usize + 1;
            index.checked_mul(26)?.checked_add(digit)
        } else {
            None
        }
    }).map(|index| index - 1)
}

/// Converts a 1-based row number to a 0-based index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Parses a cell reference such as `AB12` (absolute markers `$` allowed).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}
