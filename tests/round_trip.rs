use csvkit::dialect::{
    default_dialect, excel, informix_unload, mongodb_csv, mongodb_tsv, mysql, oracle,
    postgresql_csv, postgresql_text, rfc4180, tdf,
};
use csvkit::{parse_str, print_string, Dialect, PrintValue};
use std::io::{Read, Write};

fn parse_rows(input: &str, dialect: Dialect) -> Vec<Vec<String>> {
    parse_str(input, dialect)
        .unwrap()
        .map(|r| r.unwrap().values().to_vec())
        .collect()
}

fn print_rows(rows: &[Vec<String>], dialect: Dialect) -> String {
    let mut printer = print_string(dialect).unwrap();
    for row in rows {
        printer
            .print_record(row.iter().map(|s| s.as_str()))
            .unwrap();
    }
    printer.close().unwrap().into_inner()
}

#[test]
fn default_dialect_parse_scenario() {
    let rows = parse_rows("a,b,c\r\n1,\"two, 2\",3\r\n", default_dialect());
    assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "two, 2", "3"]]);
}

#[test]
fn mysql_format_round_trips_through_printer() {
    let input = "x\\ty\ta\t\\N\n";
    let rows = parse_rows(input, mysql());
    assert_eq!(rows, vec![vec!["x\ty", "a", ""]]);

    // The null sentinel only survives the round trip via `PrintValue::Null`
    // (a bare "" string prints as a literal empty field, not `\N`).
    let mut printer = print_string(mysql()).unwrap();
    printer
        .print_record([
            PrintValue::Str("x\ty"),
            PrintValue::Str("a"),
            PrintValue::Null,
        ])
        .unwrap();
    let printed = printer.close().unwrap().into_inner();
    assert_eq!(printed, "x\\ty\ta\t\\N\n");
}

#[test]
fn default_dialect_skips_empty_lines_rfc4180_does_not() {
    let input = "a,b\n\n\nc,d\n";
    assert_eq!(
        parse_rows(input, default_dialect()),
        vec![vec!["a", "b"], vec!["c", "d"]]
    );
    assert_eq!(
        parse_rows(input, rfc4180()),
        vec![vec!["a", "b"], vec![""], vec![""], vec!["c", "d"]]
    );
}

#[test]
fn quoted_field_may_span_multiple_physical_lines() {
    let rows = parse_rows("\"line one\r\nline two\",tail\r\n", default_dialect());
    assert_eq!(rows, vec![vec!["line one\r\nline two", "tail"]]);
}

#[test]
fn comment_lines_attach_to_the_following_record() {
    let dialect = Dialect::builder().comment_marker(Some('#')).build().unwrap();
    let mut parser = csvkit::parse_str("# meta\n1,2\n", dialect).unwrap();
    let record = parser.next_record().unwrap().unwrap();
    assert_eq!(record.comment(), Some("meta\n"));
    assert_eq!(record.values(), &["1".to_string(), "2".to_string()]);
}

#[test]
fn unterminated_quote_is_reported_as_an_error() {
    let mut parser = csvkit::parse_str("\"abc,def\n", default_dialect()).unwrap();
    let err = parser.next_record().unwrap_err();
    assert!(matches!(err, csvkit::CsvError::Parse(_)));
}

#[test]
fn excel_dialect_tolerates_unterminated_quote_at_eof() {
    let rows = parse_rows("\"abc,def\n", excel());
    assert_eq!(rows, vec![vec!["abc,def\n"]]);
}

#[test]
fn postgresql_csv_round_trip() {
    let rows = parse_rows("1,\"\",3\n", postgresql_csv());
    assert_eq!(rows[0][1], "");
    let printed = print_rows(&rows, postgresql_csv());
    assert!(printed.contains("\"\""));
}

#[test]
fn postgresql_text_escapes_tabs_and_newlines() {
    let dialect = postgresql_text();
    let printed = print_rows(&[vec!["a\tb".to_string(), "c\nd".to_string()]], dialect.clone());
    assert_eq!(printed, "a\\tb\tc\\nd\n");
    let rows = parse_rows(&printed, dialect);
    assert_eq!(rows, vec![vec!["a\tb", "c\nd"]]);
}

#[test]
fn oracle_dialect_trims_fields() {
    let rows = parse_rows("  a  ,  b  \n", oracle());
    assert_eq!(rows, vec![vec!["a", "b"]]);
}

#[test]
fn informix_unload_uses_pipe_delimiter() {
    let rows = parse_rows("1|two|three\n", informix_unload());
    assert_eq!(rows, vec![vec!["1", "two", "three"]]);
}

#[test]
fn mongodb_csv_and_tsv_share_minimal_quoting() {
    let csv_rows = parse_rows("a,\"b,c\"\r\n", mongodb_csv());
    assert_eq!(csv_rows, vec![vec!["a", "b,c"]]);

    let tsv_rows = parse_rows("a\t\"b\tc\"\r\n", mongodb_tsv());
    assert_eq!(tsv_rows, vec![vec!["a", "b\tc"]]);
}

#[test]
fn tdf_trims_surrounding_spaces() {
    let rows = parse_rows("a \t b\n", tdf());
    assert_eq!(rows, vec![vec!["a", "b"]]);
}

#[test]
fn header_auto_discovery_exposes_named_lookup() {
    let dialect = Dialect::builder().headers(Some(vec![])).build().unwrap();
    let mut parser = csvkit::parse_str("name,age\nAda,36\n", dialect).unwrap();
    let record = parser.next_record().unwrap().unwrap();
    assert_eq!(record.get_by_name("age").unwrap(), "36");
}

#[test]
fn full_file_round_trip_via_tempfile() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "name,age\r\nAda,36\r\n\"Grace, the admiral\",79\r\n").unwrap();
    let path = file.path().to_path_buf();

    let reader = std::fs::File::open(&path).unwrap();
    let parser = csvkit::parse_reader(reader, default_dialect()).unwrap();
    let records: Vec<Vec<String>> = parser.map(|r| r.unwrap().values().to_vec()).collect();
    assert_eq!(
        records,
        vec![
            vec!["name".to_string(), "age".to_string()],
            vec!["Ada".to_string(), "36".to_string()],
            vec!["Grace, the admiral".to_string(), "79".to_string()],
        ]
    );

    let mut out_buf = Vec::new();
    {
        let mut printer =
            csvkit::Printer::new(csvkit::IoCharSink::new(&mut out_buf), default_dialect()).unwrap();
        printer.print_records(records.iter().map(|r| r.iter().map(|s| s.as_str()))).unwrap();
        printer.flush().unwrap();
    }

    let mut expected = String::new();
    std::fs::File::open(&path)
        .unwrap()
        .read_to_string(&mut expected)
        .unwrap();
    assert_eq!(String::from_utf8(out_buf).unwrap(), expected);
}
