/// A monad is the positional coordinate of one word in the emitted database.
pub type Monad = u64;

/// The first monad of a fresh database.
pub const FIRST_MONAD: Monad = 1;

/// Hands out strictly increasing monads. There is no way to give one back.
#[derive(Debug, Clone)]
pub struct MonadAllocator {
    current: Monad,
}

impl MonadAllocator {
    pub fn new() -> Self {
        Self::starting_at(FIRST_MONAD)
    }

    /// Resumes numbering at `first`, e.g. to continue after a previous book.
    pub fn starting_at(first: Monad) -> Self {
        Self { current: first }
    }

    /// The monad the next word will occupy.
    pub fn current(&self) -> Monad {
        self.current
    }

    /// Consumes the current monad and returns it.
    pub fn advance(&mut self) -> Monad {
        let consumed = self.current;
        self.current += 1;
        consumed
    }
}

impl Default for MonadAllocator {
    fn default() -> Self {
        Self::new()
    }
}
