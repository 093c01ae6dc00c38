
/// Canonical contig tokens in karyotype order, used to rank chromosomes for sorted outputs
const KARYOTYPE_ORDER: [&str; 25] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10",
    "11", "12", "13", "14", "15", "16", "17", "18", "19", "20",
    "21", "22", "X", "Y", "MT"
];

/// Converts a chromosome token from any naming scheme into its canonical form.
/// One leading case-insensitive `chr` prefix is stripped and the mitochondrial aliases
/// (`M`, `MT`, `chrM`, `chrMT`, any case) all map to `MT`; everything else is kept verbatim.
/// Position and allele fields are never touched by this, only the contig token.
/// # Arguments
/// * `token` - the contig name as it appears in an input file
pub fn normalize_chromosome(token: &str) -> String {
    let stripped = match token.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &token[3..],
        _ => token
    };

    if stripped.eq_ignore_ascii_case("m") || stripped.eq_ignore_ascii_case("mt") {
        "MT".to_string()
    } else {
        stripped.to_string()
    }
}

/// Returns a sort key placing canonical human contigs in karyotype order (1..22, X, Y, MT)
/// and any other contig after them in lexicographic order.
/// The token is normalized first, so `chr2` ranks ahead of `10`.
/// # Arguments
/// * `token` - the contig name, normalized or not
pub fn chromosome_rank(token: &str) -> (usize, String) {
    let normalized = normalize_chromosome(token);
    match KARYOTYPE_ORDER.iter().position(|&c| c.eq_ignore_ascii_case(&normalized)) {
        Some(index) => (index, normalized),
        None => (KARYOTYPE_ORDER.len(), normalized)
    }
}
