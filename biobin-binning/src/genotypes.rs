//! Raw per-individual genotype codes, one row per locus.

use ndarray::Array2;

use crate::individual::MISSING_CODE;

///
/// Source of raw genotype codes for the streaming phase.
///
/// A row holds one code per individual, in the same order as the individual
/// stores: a non-negative count of variant alleles, or a negative value for
/// missing. Loci the source knows nothing about return `None` and are skipped.
///
pub trait GenotypeMatrix: Sync {
    fn n_individuals(&self) -> usize;

    fn codes(&self, locus_index: usize) -> Option<&[i8]>;
}

/// In-memory loci × individuals matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGenotypes {
    codes: Array2<i8>,
}

impl DenseGenotypes {
    /// A matrix of the given shape where every code is missing.
    pub fn new(n_loci: usize, n_individuals: usize) -> Self {
        DenseGenotypes {
            codes: Array2::from_elem((n_loci, n_individuals), MISSING_CODE),
        }
    }

    pub fn from_array(codes: Array2<i8>) -> Self {
        // rows are handed out as plain slices, so the layout must be row-major
        DenseGenotypes {
            codes: codes.as_standard_layout().into_owned(),
        }
    }

    pub fn n_loci(&self) -> usize {
        self.codes.nrows()
    }

    pub fn set(&mut self, locus_index: usize, individual: usize, code: i8) -> Option<()> {
        let cell = self.codes.get_mut((locus_index, individual))?;
        *cell = code;
        Some(())
    }

    pub fn set_row(&mut self, locus_index: usize, row: &[i8]) -> Option<()> {
        if locus_index >= self.codes.nrows() || row.len() != self.codes.ncols() {
            return None;
        }
        for (cell, &code) in self.codes.row_mut(locus_index).iter_mut().zip(row) {
            *cell = code;
        }
        Some(())
    }
}

impl GenotypeMatrix for DenseGenotypes {
    fn n_individuals(&self) -> usize {
        self.codes.ncols()
    }

    fn codes(&self, locus_index: usize) -> Option<&[i8]> {
        if locus_index >= self.codes.nrows() {
            return None;
        }
        let width = self.codes.ncols();
        let data = self.codes.as_slice()?;
        data.get(locus_index * width..(locus_index + 1) * width)
    }
}
