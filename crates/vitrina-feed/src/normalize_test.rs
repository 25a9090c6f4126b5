use super::*;

// -----------------------------------------------------------------------
// normalize_row
// -----------------------------------------------------------------------

fn make_row(pairs: &[(&str, &str)]) -> RawRow {
    RawRow::from_pairs(
        2,
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.as_bytes().to_vec())),
    )
}

fn full_row() -> RawRow {
    make_row(&[
        ("Categoria", " Celulares "),
        ("Subcategoria", "apple"),
        ("Linea", " iPhone 13 "),
        ("Modelo", " iPhone 13 Pro "),
        ("Precio", " USD 799 "),
        ("Ocultar", ""),
        ("Version", " Dual SIM "),
        ("Specs", "https://specs.example.com/iphone-13-pro"),
        ("Label", " NEW "),
        ("Capacidad", "256GB"),
        ("Condicion", "Nuevo"),
        ("Color", "Azul Sierra"),
        ("Bateria", "100%"),
        ("Fotos", "https://cdn.example.com/1.jpg,https://cdn.example.com/2.jpg"),
        ("Avatar", "https://cdn.example.com/avatar.png"),
    ])
}

#[test]
fn normalize_row_uppercases_grouping_fields() {
    let product = normalize_row(&full_row()).unwrap().unwrap();
    assert_eq!(product.category, "CELULARES");
    assert_eq!(product.subcategory, "APPLE");
    assert_eq!(product.line, "IPHONE 13");
}

#[test]
fn normalize_row_trims_other_fields_without_recasing() {
    let product = normalize_row(&full_row()).unwrap().unwrap();
    assert_eq!(product.model, "iPhone 13 Pro");
    assert_eq!(product.price, "USD 799");
    assert_eq!(product.version, "Dual SIM");
    assert_eq!(product.label, "NEW");
    assert_eq!(product.color, "Azul Sierra");
    assert_eq!(product.specs_url, "https://specs.example.com/iphone-13-pro");
}

#[test]
fn normalize_row_computes_search_fields() {
    let product = normalize_row(&full_row()).unwrap().unwrap();
    let search = product.search.expect("search fields populated");
    assert_eq!(search.model, "iphone 13 pro");
    assert_eq!(search.line, "iphone 13");
    assert_eq!(search.label, "new");
    assert_eq!(search.color, "azul sierra");
    assert_eq!(search.subcategory, "apple");
}

#[test]
fn normalize_row_absent_columns_become_empty_strings() {
    let row = make_row(&[("Categoria", "Audio"), ("Modelo", "Flip 6")]);
    let product = normalize_row(&row).unwrap().unwrap();
    assert_eq!(product.subcategory, "");
    assert_eq!(product.line, "");
    assert_eq!(product.price, "");
    assert_eq!(product.avatar, "");
}

#[test]
fn normalize_row_is_idempotent() {
    let row = full_row();
    let first = normalize_row(&row).unwrap();
    let second = normalize_row(&row).unwrap();
    assert_eq!(first, second);
}

#[test]
fn normalize_row_discards_blank_rows() {
    let row = make_row(&[
        ("Categoria", "  "),
        ("Subcategoria", ""),
        ("Modelo", " "),
        ("Precio", "100"),
    ]);
    assert!(normalize_row(&row).unwrap().is_none());
}

#[test]
fn normalize_row_discards_repeated_header_any_casing() {
    let row = make_row(&[("Categoria", "categoria"), ("Subcategoria", "SubCategoria")]);
    assert!(normalize_row(&row).unwrap().is_none());
}

#[test]
fn normalize_row_keeps_row_matching_only_one_header_name() {
    let row = make_row(&[("Categoria", "CATEGORIA"), ("Subcategoria", "Varios")]);
    assert!(normalize_row(&row).unwrap().is_some());
}

#[test]
fn normalize_row_keeps_row_with_only_model() {
    let row = make_row(&[("Modelo", "Cargador 20W")]);
    let product = normalize_row(&row).unwrap().unwrap();
    assert_eq!(product.category, "");
    assert_eq!(product.model, "Cargador 20W");
}

#[test]
fn normalize_row_rejects_invalid_utf8() {
    let row = RawRow::from_pairs(
        7,
        vec![
            ("Categoria".to_owned(), b"Audio".to_vec()),
            ("Color".to_owned(), vec![0xff, 0xfe]),
        ],
    );
    let err = normalize_row(&row).unwrap_err();
    assert!(
        matches!(err, FeedError::Normalization { line: 7, ref reason } if reason.contains("Color")),
        "expected Normalization on line 7, got: {err:?}"
    );
}

// -----------------------------------------------------------------------
// normalize_rows
// -----------------------------------------------------------------------

#[test]
fn normalize_rows_preserves_order_and_drops_non_products() {
    let rows = vec![
        make_row(&[("Categoria", "Audio"), ("Modelo", "Flip 6")]),
        make_row(&[("Categoria", "Categoria"), ("Subcategoria", "Subcategoria")]),
        make_row(&[("Categoria", ""), ("Modelo", "")]),
        make_row(&[("Categoria", "Celulares"), ("Modelo", "iPhone 13")]),
    ];
    let products = normalize_rows(&rows).unwrap();
    let models: Vec<&str> = products.iter().map(|p| p.model.as_str()).collect();
    assert_eq!(models, vec!["Flip 6", "iPhone 13"]);
}

#[test]
fn normalize_rows_fails_whole_batch_on_bad_row() {
    let rows = vec![
        make_row(&[("Categoria", "Audio"), ("Modelo", "Flip 6")]),
        RawRow::from_pairs(3, vec![("Modelo".to_owned(), vec![0xc3, 0x28])]),
    ];
    assert!(matches!(
        normalize_rows(&rows),
        Err(FeedError::Normalization { line: 3, .. })
    ));
}
