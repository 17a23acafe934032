//! Document ingestion: policy scraping and chunk segmentation

mod scraper;
mod segmenter;

pub use scraper::{ParagraphSource, PolicyScraper};
pub use segmenter::{repair_sentence_end, repair_sentence_start, Segmenter};
