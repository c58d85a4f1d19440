use std::cmp::Ordering;

///
/// Sort key for chromosome names in natural genomic order.
///
/// Numbered autosomes come first in numeric order, followed by X, Y and the
/// mitochondrial chromosome, then everything else lexicographically. A leading
/// `chr` (any case) is ignored, so `chr2`, `Chr2` and `2` all sort together.
///
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChromRank {
    Numbered(u32),
    Sex(u8),
    Mitochondrial,
    Other(String),
}

pub fn chrom_rank(chrom: &str) -> ChromRank {
    let bare = strip_chr_prefix(chrom);

    if let Ok(n) = bare.parse::<u32>() {
        return ChromRank::Numbered(n);
    }

    match bare.to_ascii_uppercase().as_str() {
        "X" => ChromRank::Sex(0),
        "Y" => ChromRank::Sex(1),
        "M" | "MT" => ChromRank::Mitochondrial,
        _ => ChromRank::Other(bare.to_string()),
    }
}

/// Compare two chromosome names in natural genomic order.
pub fn compare_chroms(a: &str, b: &str) -> Ordering {
    chrom_rank(a).cmp(&chrom_rank(b)).then_with(|| a.cmp(b))
}

fn strip_chr_prefix(chrom: &str) -> &str {
    match chrom.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &chrom[3..],
        _ => chrom,
    }
}
