use crate::error::Error;

/// Places function frames back to back on the tape
#[derive(Debug, Clone)]
pub struct Allocator {
    tail: usize,
    cells: usize,
}

impl Allocator {
    pub fn new(cells: usize) -> Self {
        Self { tail: 0, cells }
    }

    /// First cell after the last allocation
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Reserve `size` cells at the tail
    pub fn allocate(&mut self, size: usize, name: &str) -> Result<usize, Error> {
        let base = self.tail;
        if base + size > self.cells {
            return Err(Error::TapeOverflow(name.to_string(), size));
        }
        self.tail += size;
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_follow_each_other() {
        let mut alloc = Allocator::new(100);
        assert_eq!(alloc.tail(), 0);
        assert_eq!(alloc.allocate(10, "f").unwrap(), 0);
        assert_eq!(alloc.allocate(5, "g").unwrap(), 10);
        assert_eq!(alloc.tail(), 15);
        assert_eq!(alloc.allocate(0, "empty").unwrap(), 15);
        assert_eq!(alloc.tail(), 15);
    }

    #[test]
    fn overflow() {
        let mut alloc = Allocator::new(10);
        alloc.allocate(8, "f").unwrap();
        assert_eq!(alloc.allocate(2, "g").unwrap(), 8);
        assert!(matches!(alloc.allocate(1, "h"), Err(Error::TapeOverflow(..))));
        assert_eq!(alloc.tail(), 10);
    }
}
