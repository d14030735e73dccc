pub mod barrett;
pub mod impl_u64;
pub mod montgomery;
pub mod prime;
pub mod prime_generation;

pub type REDUCEMOD = u8;

pub const NONE: REDUCEMOD = 0;
pub const ONCE: REDUCEMOD = 1;
pub const TWICE: REDUCEMOD = 2;
pub const FOURTIMES: REDUCEMOD = 3;
pub const BARRETT: REDUCEMOD = 4;
pub const BARRETTLAZY: REDUCEMOD = 5;

pub trait WordOps<O> {
    /// Returns ceil(log2(self)).
    fn log2(self) -> O;
    fn reverse_bits_msb(self, n: u32) -> O;
    fn mask(self) -> O;
    /// Number of significant bits.
    fn bit_count(self) -> usize;
}

impl WordOps<u64> for u64 {
    #[inline(always)]
    fn log2(self) -> u64 {
        (u64::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> u64 {
        if n == 0 {
            return 0;
        }
        self.reverse_bits() >> (u64::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> u64 {
        (1 << self.log2()) - 1
    }
    #[inline(always)]
    fn bit_count(self) -> usize {
        (u64::BITS - self.leading_zeros()) as usize
    }
}

impl WordOps<usize> for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        if n == 0 {
            return 0;
        }
        self.reverse_bits() >> (usize::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> usize {
        (1 << self.log2()) - 1
    }
    #[inline(always)]
    fn bit_count(self) -> usize {
        (usize::BITS - self.leading_zeros()) as usize
    }
}

pub trait ReduceOnce<O> {
    /// Assigns self-q to self if self >= q in constant time.
    /// User must ensure that 2q fits in O.
    fn reduce_once_constant_time_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self in constant time.
    fn reduce_once_constant_time(&self, q: O) -> O;
    /// Assigns self-q to self if self >= q.
    fn reduce_once_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self.
    fn reduce_once(&self, q: O) -> O;
}

pub trait ScalarOperations<O> {
    // Applies a parameterized modular reduction.
    fn sa_reduce_into_sa<const REDUCE: REDUCEMOD>(&self, a: &mut O);

    // Assigns a + b to c.
    fn sa_add_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &O, b: &O, c: &mut O);

    // Assigns a + b to b.
    fn sa_add_sb_into_sb<const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut O);

    // Assigns a - b to c.
    fn sa_sub_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &O, b: &O, c: &mut O);

    // Assigns a - b to b.
    fn sa_sub_sb_into_sb<const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut O);

    // Assigns a - b to a.
    fn sa_sub_sb_into_sa<const REDUCE: REDUCEMOD>(&self, b: &O, a: &mut O);

    // Assigns -a to a.
    fn sa_neg_into_sa<const REDUCE: REDUCEMOD>(&self, a: &mut O);

    // Assigns -a to b.
    fn sa_neg_into_sb<const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut O);

    // Assigns a * b to c.
    fn sa_mul_sb_into_sc(&self, a: &O, b: &O, c: &mut O);

    // Assigns a * b to b.
    fn sa_mul_sb_into_sb(&self, a: &O, b: &mut O);

    // Assigns c + a * b to c.
    fn sa_mul_sb_add_sc_into_sc(&self, a: &O, b: &O, c: &mut O);

    // Assigns a * b to c.
    fn sa_barrett_mul_sb_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &barrett::Barrett<O>,
        b: &O,
        c: &mut O,
    );

    // Assigns a * b to b.
    fn sa_barrett_mul_sb_into_sb<const REDUCE: REDUCEMOD>(
        &self,
        a: &barrett::Barrett<O>,
        b: &mut O,
    );

    // Assigns (a + 2q - b) * c to a.
    fn sa_sub_sb_mul_sc_into_sa<const REDUCE: REDUCEMOD>(
        &self,
        b: &O,
        c: &barrett::Barrett<O>,
        a: &mut O,
    );
}

pub trait VectorOperations<O> {
    // vec(a) <- vec(a) mod q.
    fn va_reduce_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &mut [O]);

    // vec(c) <- vec(a) + vec(b).
    fn va_add_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &[O],
        c: &mut [O],
    );

    // vec(b) <- vec(a) + vec(b).
    fn va_add_vb_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &[O], b: &mut [O]);

    // vec(b) <- vec(b) + scalar(a).
    fn sa_add_vb_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut [O]);

    // vec(c) <- vec(a) - vec(b).
    fn va_sub_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &[O],
        c: &mut [O],
    );

    // vec(b) <- vec(a) - vec(b).
    fn va_sub_vb_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &[O], b: &mut [O]);

    // vec(a) <- vec(a) - vec(b).
    fn va_sub_vb_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, b: &[O], a: &mut [O]);

    // vec(b) <- vec(b) - scalar(a).
    fn vb_sub_sa_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut [O]);

    // vec(a) <- -vec(a).
    fn va_neg_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &mut [O]);

    // vec(b) <- -vec(a).
    fn va_neg_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &[O], b: &mut [O]);

    // vec(c) <- vec(a) * vec(b).
    fn va_mul_vb_into_vc<const CHUNK: usize>(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(b) <- vec(a) * vec(b).
    fn va_mul_vb_into_vb<const CHUNK: usize>(&self, a: &[O], b: &mut [O]);

    // vec(c) <- vec(c) + vec(a) * vec(b).
    fn va_mul_vb_add_vc_into_vc<const CHUNK: usize>(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(b) <- vec(b) * scalar(a).
    fn sa_barrett_mul_vb_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &barrett::Barrett<O>,
        b: &mut [O],
    );

    // vec(c) <- vec(b) * scalar(a).
    fn sa_barrett_mul_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &barrett::Barrett<O>,
        b: &[O],
        c: &mut [O],
    );

    // vec(a) <- (vec(a) + 2q - vec(b)) * scalar(c).
    fn va_sub_vb_mul_sc_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        b: &[O],
        c: &barrett::Barrett<O>,
        a: &mut [O],
    );
}
