use crate::modulus::barrett::Barrett;
use crate::modulus::{BARRETT, ONCE};
use crate::poly::{Poly, PolyRNS};
use crate::ring::RingRNS;

impl RingRNS<u64> {
    /// Returns, for each i < level, (q[level] mod q[i])^-1 mod q[i].
    pub fn rescaling_constant(&self) -> Vec<Barrett<u64>> {
        let level: usize = self.level();
        let q_scale: u64 = self.rings[level].modulus.q;
        self.rings[..level]
            .iter()
            .map(|r| {
                let q_scale_mod_qi: u64 = r.modulus.barrett.reduce::<BARRETT>(&q_scale);
                r.modulus.barrett.prepare(r.modulus.inv(q_scale_mod_qi))
            })
            .collect()
    }

    /// Assigns round(a / q[level]) to b, with b at level-1.
    /// Expects a in the coefficient domain.
    pub fn div_round_by_last_modulus(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        assert!(level > 0, "cannot divide by the last modulus at level 0");
        debug_assert!(a.level() >= level, "a.level()={} < level={}", a.level(), level);
        debug_assert!(b.level() + 1 >= level, "b.level()={} < level-1={}", b.level(), level - 1);
        (0..level).for_each(|i| b.at_mut(i).copy_from(a.at(i)));
        self.div_round_by_last_modulus_core(a.at(level), &mut b.0[..level]);
    }

    /// Assigns round(a / q[level]) to a and drops its last residue.
    /// Expects a in the coefficient domain.
    pub fn div_round_by_last_modulus_inplace(&self, a: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        assert!(level > 0, "cannot divide by the last modulus at level 0");
        debug_assert!(a.level() >= level, "a.level()={} < level={}", a.level(), level);
        let (a_i, a_level) = a.split_at_mut(level);
        self.div_round_by_last_modulus_core(&a_level[0], a_i);
        a.truncate(level - 1);
    }

    /// round(x / q_l) = (x_i - ([x + q_l/2]_{q_l} - q_l/2)) * q_l^-1 mod q_i.
    fn div_round_by_last_modulus_core(&self, a_last: &Poly<u64>, a_i: &mut [Poly<u64>]) {
        let level: usize = self.level();
        let last = &self.rings[level];
        let half: u64 = last.modulus.q >> 1;

        let mut shifted: Poly<u64> = last.new_poly();
        shifted.copy_from(a_last);
        last.add_scalar_inplace::<ONCE>(&half, &mut shifted);

        let rescaling_constants: Vec<Barrett<u64>> = self.rescaling_constant();
        let mut buf: Poly<u64> = self.new_poly();

        for (i, r) in self.rings[..level].iter().enumerate() {
            let half_mod_qi: u64 = r.modulus.barrett.reduce::<BARRETT>(&half);
            r.reduce_from(&shifted.0, &mut buf);
            r.sub_scalar_inplace::<ONCE>(&half_mod_qi, &mut buf);
            r.sub_mul_scalar_barrett_inplace::<ONCE>(&buf, &rescaling_constants[i], &mut a_i[i]);
        }
    }
}
