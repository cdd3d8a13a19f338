use crate::code_pair_iter::{CodePairIter, DirectCodePairIter, TextCodePairIter};
use crate::CodePair;
use crate::DxfResult;
use std::io::Cursor;

/// A code pair source with single-pair look-ahead.  Unlike a plain iterator this lets the
/// decoder return a record-boundary pair (group 0) to the stream for the next caller.
/// Comment pairs (group 999) pass through untouched; surfacing them is the decoder's job.
pub struct CodePairPutBack {
    top: Vec<DxfResult<CodePair>>,
    iter: Box<dyn CodePairIter>,
}

impl CodePairPutBack {
    pub fn from_code_pair_iter(iter: Box<dyn CodePairIter>) -> Self {
        CodePairPutBack { top: vec![], iter }
    }
    /// Convenience constructor for decoding a tag stream held in a string.
    pub fn from_text(text: &str) -> Self {
        let iter = TextCodePairIter::from_str_source(Cursor::new(text.as_bytes().to_vec()));
        CodePairPutBack::from_code_pair_iter(Box::new(iter))
    }
    /// Convenience constructor for decoding pairs already in memory.
    pub fn from_pairs(pairs: Vec<CodePair>) -> Self {
        CodePairPutBack::from_code_pair_iter(Box::new(DirectCodePairIter::new(pairs)))
    }
    pub fn put_back(&mut self, item: DxfResult<CodePair>) {
        self.top.push(item);
    }
    pub fn read_as_utf8(&mut self) {
        self.iter.read_as_utf8()
    }
}

impl Iterator for CodePairPutBack {
    type Item = DxfResult<CodePair>;

    fn next(&mut self) -> Option<DxfResult<CodePair>> {
        match self.top.pop() {
            Some(item) => Some(item),
            None => self.iter.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CodePairPutBack;
    use crate::CodePair;

    #[test]
    fn put_back_returns_most_recent_first() {
        let mut iter = CodePairPutBack::from_pairs(vec![CodePair::new_f64(10, 1.0)]);
        let pair = iter.next().unwrap().unwrap();
        iter.put_back(Ok(pair));
        let pair = iter.next().unwrap().unwrap();
        assert_eq!(CodePair::new_f64(10, 1.0), pair);
        assert!(iter.next().is_none());
    }

    #[test]
    fn comment_pairs_pass_through() {
        let mut iter = CodePairPutBack::from_text("999\r\na comment\r\n0\r\nCIRCLE");
        let pair = iter.next().unwrap().unwrap();
        assert_eq!(999, pair.code);
        assert_eq!("a comment", pair.assert_string().unwrap());
        let pair = iter.next().unwrap().unwrap();
        assert_eq!(0, pair.code);
    }
}
