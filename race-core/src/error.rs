use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no unused word found after {attempts} draws")]
    WordPoolExhausted { attempts: usize },
    #[error("word list is empty")]
    EmptyWordList,
}
