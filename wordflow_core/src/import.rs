//! Catalog import from Excel and CSV word lists

use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;

use crate::catalog::{Catalog, Difficulty, Translation, Word};
use crate::error::{Result, WordflowError};

/// Separator between several meanings (and their parts of speech) in one cell
pub const MEANING_SEPARATOR: char = ';';
/// Separator between example sentences in one cell
pub const EXAMPLE_SEPARATOR: char = '|';

/// Load a catalog from a `.csv`, `.xlsx` or `.xls` file
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let catalog = match extension.as_str() {
        "xlsx" | "xls" => import_excel(path),
        "csv" => import_csv(path),
        _ => Err(WordflowError::UnsupportedFormat(extension)),
    }?;
    log::info!("Imported {} words from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Column index mapping
#[derive(Debug, Default, Clone)]
struct ColumnMapping {
    id: Option<usize>,
    word: usize,
    phonetic: Option<usize>,
    part_of_speech: Option<usize>,
    meaning: usize,
    examples: Option<usize>,
    difficulty: Option<usize>,
}

/// Detect column indices from header names
fn detect_columns(headers: &[String]) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::default();
    let mut word = None;
    let mut meaning = None;

    for (i, header) in headers.iter().enumerate() {
        match header.trim().to_lowercase().as_str() {
            "id" => mapping.id = Some(i),
            "word" | "words" | "vocabulary" => word = Some(i),
            "phonetic" | "pronunciation" => mapping.phonetic = Some(i),
            "part_of_speech" | "pos" => mapping.part_of_speech = Some(i),
            "meaning" | "meanings" | "definition" | "definitions" => meaning = Some(i),
            "example" | "examples" => mapping.examples = Some(i),
            "difficulty" | "level" => mapping.difficulty = Some(i),
            _ => {} // Unknown columns ignored
        }
    }

    mapping.word = word
        .ok_or_else(|| WordflowError::Import("Missing required 'Word' column".to_string()))?;
    mapping.meaning = meaning
        .ok_or_else(|| WordflowError::Import("Missing required 'Meaning' column".to_string()))?;
    Ok(mapping)
}

/// A usable data row, remembering whether its id came from the file
struct ParsedRow {
    word: Word,
    explicit_id: bool,
}

/// Turn one row of cell strings into a word; `None` if the row is unusable
fn build_word(cells: &[String], mapping: &ColumnMapping, row_number: usize) -> Option<ParsedRow> {
    let cell = |idx: Option<usize>| cell_at(cells, idx);

    let word = cell(Some(mapping.word));
    if word.is_empty() {
        return None;
    }

    let parts_of_speech: Vec<&str> = cell(mapping.part_of_speech)
        .split(MEANING_SEPARATOR)
        .map(str::trim)
        .collect();
    let translations: Vec<Translation> = cell(Some(mapping.meaning))
        .split(MEANING_SEPARATOR)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .enumerate()
        .map(|(i, meaning)| Translation {
            part_of_speech: parts_of_speech.get(i).copied().unwrap_or("").to_string(),
            meaning: meaning.to_string(),
        })
        .collect();

    let examples: Vec<String> = cell(mapping.examples)
        .split(EXAMPLE_SEPARATOR)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();

    if translations.is_empty() || examples.is_empty() {
        log::warn!(
            "Skipping row {} ('{}'): needs at least one meaning and one example",
            row_number,
            word
        );
        return None;
    }

    let difficulty = match cell(mapping.difficulty) {
        "" => Difficulty::Medium,
        raw => raw.parse().unwrap_or_else(|_| {
            log::warn!("Row {}: unknown difficulty '{}', using medium", row_number, raw);
            Difficulty::Medium
        }),
    };

    let (id, explicit_id) = match cell(mapping.id) {
        "" => (row_number.to_string(), false),
        id => (id.to_string(), true),
    };

    Some(ParsedRow {
        word: Word {
            id,
            word: word.to_string(),
            phonetic: cell(mapping.phonetic).to_string(),
            translations,
            examples,
            difficulty,
        },
        explicit_id,
    })
}

/// Build the catalog, dropping rows whose row-number id is taken by an
/// explicit id elsewhere in the file. Duplicate explicit ids still fail.
fn into_catalog(rows: Vec<ParsedRow>) -> Result<Catalog> {
    let explicit: HashSet<String> = rows
        .iter()
        .filter(|r| r.explicit_id)
        .map(|r| r.word.id.clone())
        .collect();

    let words = rows
        .into_iter()
        .filter_map(|row| {
            if !row.explicit_id && explicit.contains(&row.word.id) {
                log::warn!(
                    "Skipping row {} ('{}'): its default id is used by another row",
                    row.word.id,
                    row.word.word
                );
                return None;
            }
            Some(row.word)
        })
        .collect();

    Catalog::new(words)
}

fn cell_at(cells: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| cells.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

/// Parse the first sheet of an Excel workbook (`.xlsx` or legacy `.xls`)
pub fn import_excel<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let mut workbook = open_workbook_auto(path.as_ref())
        .map_err(|e| WordflowError::Excel(format!("Failed to open Excel file: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| WordflowError::Excel("No sheets found in Excel file".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| WordflowError::Excel(format!("Failed to read sheet: {}", e)))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| WordflowError::Import("Empty file - no header row".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(cell_string).collect();
    let mapping = detect_columns(&headers)?;

    let parsed = rows
        .enumerate()
        .filter_map(|(i, row)| {
            let cells: Vec<String> = row.iter().map(cell_string).collect();
            build_word(&cells, &mapping, i + 1)
        })
        .collect();

    into_catalog(parsed)
}

/// Parse a CSV file with a header row
pub fn import_csv<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path.as_ref())?;

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mapping = detect_columns(&headers)?;

    let mut parsed = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if let Some(row) = build_word(&cells, &mapping, i + 1) {
            parsed.push(row);
        }
    }

    into_catalog(parsed)
}

/// Helper to extract string from Excel cell
fn cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    enum XlsxCell<'a> {
        Text(&'a str),
        Number(f64),
        Blank,
    }

    /// Minimal one-sheet workbook with inline strings, enough for calamine
    fn write_xlsx(rows: &[Vec<XlsxCell>]) -> tempfile::NamedTempFile {
        let mut sheet_data = String::new();
        for (r, row) in rows.iter().enumerate() {
            sheet_data.push_str(&format!("<row r=\"{}\">", r + 1));
            for (c, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
                match cell {
                    XlsxCell::Text(text) => sheet_data.push_str(&format!(
                        "<c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                        reference, text
                    )),
                    XlsxCell::Number(n) => sheet_data
                        .push_str(&format!("<c r=\"{}\"><v>{}</v></c>", reference, n)),
                    XlsxCell::Blank => {}
                }
            }
            sheet_data.push_str("</row>");
        }

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
                    .to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Words" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                    .to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    sheet_data
                ),
            ),
        ];

        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut zip = ZipWriter::new(file.reopen().unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, body) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        file
    }

    #[test]
    fn test_import_csv_full_columns() {
        let file = write_csv(
            "ID,Word,Phonetic,POS,Meaning,Examples,Difficulty\n\
             w1,lucid,/ˈluːsɪd/,adj.;adj.,clear;bright,\"A lucid, calm answer.|Lucid dreams.\",easy\n\
             w2,ponder,/ˈpɒndə/,v.,think about,Ponder the question.,HARD\n",
        );

        let catalog = import_csv(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let lucid = catalog.get("w1").unwrap();
        assert_eq!(lucid.translations.len(), 2);
        assert_eq!(lucid.translations[1].meaning, "bright");
        assert_eq!(lucid.examples, vec!["A lucid, calm answer.", "Lucid dreams."]);
        assert_eq!(lucid.difficulty, Difficulty::Easy);
        assert_eq!(catalog.get("w2").unwrap().difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_import_csv_defaults_and_skips() {
        let file = write_csv(
            "word,meaning,example\n\
             terse,brief,A terse reply.\n\
             ,orphan,No headword.\n\
             vague,unclear,\n\
             zeal,enthusiasm,Full of zeal.\n",
        );

        let catalog = import_csv(file.path()).unwrap();
        let words: Vec<&str> = catalog.words().iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["terse", "zeal"]);
        assert_eq!(catalog.get("1").unwrap().word, "terse");
        assert_eq!(catalog.get("4").unwrap().difficulty, Difficulty::Medium);
        assert_eq!(catalog.get("4").unwrap().translations[0].part_of_speech, "");
    }

    #[test]
    fn test_import_csv_requires_columns() {
        let file = write_csv("word,example\nterse,A terse reply.\n");
        assert!(matches!(
            import_csv(file.path()),
            Err(WordflowError::Import(_))
        ));
    }

    #[test]
    fn test_import_csv_with_no_usable_rows() {
        let file = write_csv("word,meaning\nterse,brief\n");
        assert!(matches!(
            import_csv(file.path()),
            Err(WordflowError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_import_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        match import_file(file.path()) {
            Err(WordflowError::UnsupportedFormat(ext)) => assert_eq!(ext, "txt"),
            other => panic!("expected unsupported format, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_import_excel_workbook() {
        use XlsxCell::{Blank, Number, Text};
        let file = write_xlsx(&[
            vec![
                Text("ID"),
                Text("Vocabulary"),
                Text("Pronunciation"),
                Text("POS"),
                Text("Definitions"),
                Text("Examples"),
                Text("Level"),
            ],
            vec![
                Number(7.0),
                Text("lucid"),
                Text("/lu:sid/"),
                Text("adj.; adj."),
                Text("clear; bright"),
                Text("A lucid answer.|Lucid dreams."),
                Text("easy"),
            ],
            vec![
                Blank,
                Text("ponder"),
                Blank,
                Text("v."),
                Text("think about"),
                Text("Ponder the question."),
                Number(3.0),
            ],
            vec![Blank, Text("vague"), Blank, Blank, Text("unclear")],
        ]);

        let catalog = import_excel(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let lucid = catalog.get("7").unwrap();
        assert_eq!(lucid.phonetic, "/lu:sid/");
        assert_eq!(lucid.translations.len(), 2);
        assert_eq!(lucid.translations[1].part_of_speech, "adj.");
        assert_eq!(lucid.translations[1].meaning, "bright");
        assert_eq!(lucid.examples, vec!["A lucid answer.", "Lucid dreams."]);
        assert_eq!(lucid.difficulty, Difficulty::Easy);

        // Row-number id; a numeric level is not a difficulty name
        let ponder = catalog.get("2").unwrap();
        assert_eq!(ponder.word, "ponder");
        assert_eq!(ponder.difficulty, Difficulty::Medium);
        assert_eq!(ponder.translations[0].part_of_speech, "v.");
    }

    #[test]
    fn test_import_excel_requires_columns() {
        let file = write_xlsx(&[
            vec![XlsxCell::Text("Word"), XlsxCell::Text("Examples")],
            vec![XlsxCell::Text("terse"), XlsxCell::Text("A terse reply.")],
        ]);
        assert!(matches!(
            import_excel(file.path()),
            Err(WordflowError::Import(_))
        ));
    }

    #[test]
    fn test_import_excel_rejects_garbage() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"not a workbook").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            import_file(file.path()),
            Err(WordflowError::Excel(_))
        ));
    }

    #[test]
    fn test_cell_string_numbers() {
        assert_eq!(cell_string(&Data::Float(7.0)), "7");
        assert_eq!(cell_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_string(&Data::Int(42)), "42");
        assert_eq!(cell_string(&Data::String("  lucid ".to_string())), "lucid");
        assert_eq!(cell_string(&Data::Empty), "");
    }

    #[test]
    fn test_default_id_yields_to_explicit_id() {
        let file = write_csv(
            "id,word,meaning,examples\n\
             ,terse,brief,A terse reply.\n\
             1,zeal,enthusiasm,Full of zeal.\n\
             ,vague,unclear,A vague answer.\n",
        );

        let catalog = import_csv(file.path()).unwrap();
        let words: Vec<&str> = catalog.words().iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["zeal", "vague"]);
        assert_eq!(catalog.get("1").unwrap().word, "zeal");
        assert_eq!(catalog.get("3").unwrap().word, "vague");
    }

    #[test]
    fn test_duplicate_explicit_ids_rejected() {
        let file = write_csv(
            "id,word,meaning,examples\n\
             a,terse,brief,A terse reply.\n\
             a,zeal,enthusiasm,Full of zeal.\n",
        );
        assert!(matches!(
            import_csv(file.path()),
            Err(WordflowError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_import_file_dispatches_csv() {
        let file = write_csv("word,meaning,examples\nterse,brief,A terse reply.\n");
        assert_eq!(import_file(file.path()).unwrap().len(), 1);
    }
}
