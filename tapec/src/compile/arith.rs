//! Arithmetic over tape cells.
//!
//! Operations take the left operand in `dst` and the right operand in a
//! scratch cell `rhs`. The result replaces `dst` and `rhs` is left at zero.

use super::tape::Tape;
use crate::grammer::ast::BinaryOp;

impl Tape {
    /// dst += (x == 0), x = 0. `dst` must be 0.
    pub fn not_into(&mut self, x: usize, dst: usize) {
        self.add(dst, 1);
        self.open(x);
        self.sub(dst, 1);
        self.clear(x);
        self.close(x);
    }

    /// dst += (x != 0), x = 0. `dst` must be 0.
    pub fn bool_into(&mut self, x: usize, dst: usize) {
        self.open(x);
        self.add(dst, 1);
        self.clear(x);
        self.close(x);
    }

    /// q += n / d, r += n % d, n = 0, d unchanged.
    /// Dividing by zero yields q = 0 and r = n.
    pub fn divmod(&mut self, n: usize, d: usize, q: usize, r: usize) {
        let c = self.temp(1);
        let nonzero = self.temp(1);
        let zero = self.temp(1);

        let t = self.temp(1);
        self.copy(d, t);
        self.bool_into(t, nonzero);
        self.copy(d, t);
        self.not_into(t, zero);
        self.release(t);

        self.open(nonzero);
        {
            self.copy(d, c);
            self.open(n);
            {
                self.sub(n, 1);
                self.add(r, 1);
                self.sub(c, 1);

                // Counter exhausted: one more whole divisor
                let z = self.temp(1);
                let t = self.temp(1);
                self.copy(c, t);
                self.not_into(t, z);
                self.release(t);
                self.open(z);
                self.add(q, 1);
                self.clear(r);
                self.copy(d, c);
                self.sub(z, 1);
                self.close(z);
                self.release(z);
            }
            self.close(n);
            self.clear(c);
            self.sub(nonzero, 1);
        }
        self.close(nonzero);

        self.open(zero);
        self.mov(n, r);
        self.sub(zero, 1);
        self.close(zero);

        self.release(c);
    }

    pub fn binary(&mut self, op: BinaryOp, dst: usize, rhs: usize) {
        match op {
            BinaryOp::Add => self.mov(rhs, dst),
            BinaryOp::Sub => self.mov_neg(rhs, dst),
            BinaryOp::Mul => self.mul(dst, rhs),
            BinaryOp::Div => self.div(dst, rhs, false),
            BinaryOp::Mod => self.div(dst, rhs, true),
            BinaryOp::Shl => self.shl(dst, rhs),
            BinaryOp::Shr => self.shr(dst, rhs),
            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => self.bitwise(op, dst, rhs),
        }
    }

    /// dst *= rhs
    fn mul(&mut self, dst: usize, rhs: usize) {
        let x = self.temp(1);
        self.mov(dst, x);
        self.open(x);
        self.copy(rhs, dst);
        self.sub(x, 1);
        self.close(x);
        self.clear(rhs);
        self.release(x);
    }

    /// dst /= rhs, or dst %= rhs
    fn div(&mut self, dst: usize, rhs: usize, rem: bool) {
        let n = self.temp(1);
        let q = self.temp(1);
        let r = self.temp(1);
        self.mov(dst, n);
        self.divmod(n, rhs, q, r);
        let (keep, drop) = if rem { (r, q) } else { (q, r) };
        self.mov(keep, dst);
        self.clear(drop);
        self.clear(rhs);
        self.release(n);
    }

    /// dst <<= rhs
    fn shl(&mut self, dst: usize, rhs: usize) {
        self.open(rhs);
        let x = self.temp(1);
        self.mov(dst, x);
        self.open(x);
        self.add(dst, 2);
        self.sub(x, 1);
        self.close(x);
        self.release(x);
        self.sub(rhs, 1);
        self.close(rhs);
    }

    /// dst >>= rhs
    fn shr(&mut self, dst: usize, rhs: usize) {
        self.open(rhs);
        let two = self.temp(1);
        self.add(two, 2);
        self.div(dst, two, false);
        self.release(two);
        self.sub(rhs, 1);
        self.close(rhs);
    }

    /// Bitwise operators, one bit per step from the least significant
    fn bitwise(&mut self, op: BinaryOp, dst: usize, rhs: usize) {
        let a = self.temp(1);
        let two = self.temp(1);
        self.mov(dst, a);
        self.add(two, 2);

        for bit in 0..8 {
            let weight = 1u8 << bit;
            let qa = self.temp(1);
            let ra = self.temp(1);
            let qb = self.temp(1);
            let rb = self.temp(1);
            self.divmod(a, two, qa, ra);
            self.mov(qa, a);
            self.divmod(rhs, two, qb, rb);
            self.mov(qb, rhs);

            match op {
                BinaryOp::And => {
                    self.open(ra);
                    self.open(rb);
                    self.add(dst, weight);
                    self.sub(rb, 1);
                    self.close(rb);
                    self.sub(ra, 1);
                    self.close(ra);
                    self.clear(rb);
                }
                BinaryOp::Or => {
                    let f = self.temp(1);
                    self.mov(rb, ra);
                    self.bool_into(ra, f);
                    self.open(f);
                    self.add(dst, weight);
                    self.sub(f, 1);
                    self.close(f);
                    self.release(f);
                }
                _ => {
                    let q = self.temp(1);
                    let r = self.temp(1);
                    self.mov(rb, ra);
                    self.divmod(ra, two, q, r);
                    self.open(r);
                    self.add(dst, weight);
                    self.sub(r, 1);
                    self.close(r);
                    self.clear(q);
                    self.release(q);
                }
            }
            self.release(qa);
        }

        self.clear(a);
        self.clear(two);
        self.release(a);
    }

    /// dst = 0 - x, x = 0
    pub fn negate(&mut self, x: usize, dst: usize) {
        self.mov_neg(x, dst);
    }

    /// dst = 255 - x, x = 0
    pub fn complement(&mut self, x: usize, dst: usize) {
        self.sub(dst, 1);
        self.mov_neg(x, dst);
    }
}
