//! Descriptive statistics over numeric samples.

pub mod histogram;

pub use histogram::{
    BinRule, Bins, Histogram, HistogramBin, HistogramError, HistogramOptions, HistogramSeries,
    hist, histogram,
};
