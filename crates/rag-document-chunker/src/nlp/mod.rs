pub mod segmenter;
pub mod tokenizer;

pub use segmenter::{
    SegmentationOutcome, SentenceSegmenter, SentenceSegmenterAdapter, TaggedSentence,
    UnicodeSentenceSegmenter,
};
pub use tokenizer::{HfTokenizer, Tokenizer};
