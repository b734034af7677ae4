use crate::item::LibraryBook;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 내보내기 헤더. 모든 행은 이 아홉 개 필드 순서를 따른다.
const HEADER: [&str; 9] = [
    "ISBN", "Title", "Author", "Publisher", "PageCount", "Price", "Location", "AddedDate", "Synopsis",
];

/// 내보내기 필드 구분자
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Separator {
    Comma,
    Tab,
}

impl Separator {
    pub fn as_char(&self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Tab => '\t',
        }
    }
}

/// 서재 도서 목록을 구분자 텍스트로 직렬화 한다.
///
/// 자유 텍스트 필드 안의 구분자와 줄바꿈은 공백 하나로 치환 된다.
/// 인용부호 이스케이프는 하지 않는다.
pub fn write_delimited<W: Write>(
    writer: &mut W,
    books: &[LibraryBook],
    separator: Separator,
) -> io::Result<()> {
    let sep = separator.as_char();
    let sep_str = sep.to_string();

    writeln!(writer, "{}", HEADER.join(&sep_str))?;

    for book in books {
        let fields = [
            sanitize(book.isbn(), sep),
            sanitize(book.title(), sep),
            sanitize(book.author(), sep),
            sanitize(book.publisher().unwrap_or(""), sep),
            book.page_count().map(|v| v.to_string()).unwrap_or_default(),
            book.price().map(|v| v.to_string()).unwrap_or_default(),
            format_location(book),
            book.added_at().map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_default(),
            sanitize(book.synopsis().unwrap_or(""), sep),
        ];

        writeln!(writer, "{}", fields.join(&sep_str))?;
    }

    Ok(())
}

/// 서재 도서 목록을 파일로 내보낸다.
pub fn export_to_file<P: AsRef<Path>>(
    path: P,
    books: &[LibraryBook],
    separator: Separator,
) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write_delimited(&mut writer, books, separator)?;
    writer.flush()
}

fn sanitize(value: &str, separator: char) -> String {
    value.chars()
        .map(|c| {
            if c == separator || c == '\n' || c == '\r' {
                ' '
            } else {
                c
            }
        })
        .collect()
}

fn format_location(book: &LibraryBook) -> String {
    match book.location() {
        Some(location) => format!("{}-{}", location.bookcase(), location.shelf()),
        None => "-".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ShelfLocation;

    fn book(isbn: &str, title: &str) -> LibraryBook {
        LibraryBook::builder()
            .isbn(isbn)
            .title(title)
            .author("Frank Herbert")
            .build()
            .unwrap()
    }

    #[test]
    fn writes_header_and_one_row_per_book() {
        let books = vec![book("9780441013593", "Dune"), book("9780553293357", "Foundation")];
        let mut output = Vec::new();

        write_delimited(&mut output, &books, Separator::Comma).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ISBN,Title,Author,Publisher,PageCount,Price,Location,AddedDate,Synopsis");
    }

    #[test]
    fn embedded_separator_is_replaced_and_row_still_has_nine_fields() {
        let with_commas = book("9780441013593", "Dune")
            .to_builder()
            .synopsis("Politics, religion, and spice.")
            .build()
            .unwrap();
        let plain = book("9780553293357", "Foundation");
        let mut output = Vec::new();

        write_delimited(&mut output, &[with_commas, plain], Separator::Comma).unwrap();

        let text = String::from_utf8(output).unwrap();
        for line in text.lines().skip(1) {
            assert_eq!(line.split(',').count(), 9, "row was: {}", line);
        }
        assert!(text.contains("Politics  religion  and spice."));
    }

    #[test]
    fn tab_separator_keeps_embedded_commas() {
        let with_commas = book("9780441013593", "Dune")
            .to_builder()
            .synopsis("Politics, religion, and spice.")
            .build()
            .unwrap();
        let mut output = Vec::new();

        write_delimited(&mut output, &[with_commas], Separator::Tab).unwrap();

        let text = String::from_utf8(output).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row.split('\t').count(), 9);
        assert!(row.contains("Politics, religion, and spice."));
    }

    #[test]
    fn location_renders_as_bookcase_dash_shelf() {
        let located = book("9780441013593", "Dune")
            .to_builder()
            .location(ShelfLocation::new(3, 2).unwrap())
            .build()
            .unwrap();
        let unlocated = book("9780553293357", "Foundation");
        let mut output = Vec::new();

        write_delimited(&mut output, &[located, unlocated], Separator::Comma).unwrap();

        let text = String::from_utf8(output).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows[0].split(',').nth(6), Some("3-2"));
        assert_eq!(rows[1].split(',').nth(6), Some("-"));
    }

    #[test]
    fn newline_in_free_text_collapses_to_space() {
        let multiline = book("9780441013593", "Dune")
            .to_builder()
            .synopsis("line one\nline two")
            .build()
            .unwrap();
        let mut output = Vec::new();

        write_delimited(&mut output, &[multiline], Separator::Comma).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("line one line two"));
    }
}
