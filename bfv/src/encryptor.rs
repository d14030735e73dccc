use crate::ciphertext::Ciphertext;
use crate::context::{Context, ContextData};
use crate::error::{check_parms_id, Error, Result};
use crate::keygen::noise_distribution;
use crate::keys::{PublicKey, SecretKey, SecretPoly};
use crate::plaintext::{add_scaled_plain, Plaintext};
use math::modulus::ONCE;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use sampling::distributions::Distribution;
use sampling::source::Source;
use std::sync::Arc;

/// Encrypts plaintexts at the first data level, with a public key or a
/// secret key.
pub struct Encryptor {
    context: Arc<Context>,
    public_key: Option<PublicKey>,
    secret_key: Option<SecretPoly>,
    source_xa: Source,
    source_xu: Source,
    source_xe: Source,
    dist_xe: Distribution,
}

impl Encryptor {
    fn new(context: &Arc<Context>) -> Result<Self> {
        let mut source: Source = Source::from_entropy();
        Ok(Self {
            context: context.clone(),
            public_key: None,
            secret_key: None,
            source_xa: source.branch(),
            source_xu: source.branch(),
            source_xe: source.branch(),
            dist_xe: noise_distribution()?,
        })
    }

    pub fn with_public_key(context: &Arc<Context>, public_key: &PublicKey) -> Result<Self> {
        let mut encryptor: Encryptor = Self::new(context)?;
        encryptor.set_public_key(public_key)?;
        Ok(encryptor)
    }

    pub fn with_secret_key(context: &Arc<Context>, secret_key: &SecretKey) -> Result<Self> {
        let mut encryptor: Encryptor = Self::new(context)?;
        encryptor.set_secret_key(secret_key)?;
        Ok(encryptor)
    }

    /// Replaces the randomness with sources branched from source.
    pub fn with_source(mut self, mut source: Source) -> Self {
        self.source_xa = source.branch();
        self.source_xu = source.branch();
        self.source_xe = source.branch();
        self
    }

    pub fn set_public_key(&mut self, public_key: &PublicKey) -> Result<()> {
        check_parms_id(public_key.parms_id(), self.context.key_parms_id())?;
        self.public_key = Some(public_key.clone());
        Ok(())
    }

    pub fn set_secret_key(&mut self, secret_key: &SecretKey) -> Result<()> {
        check_parms_id(secret_key.parms_id(), self.context.key_parms_id())?;
        self.secret_key = Some(SecretPoly(secret_key.poly.0.clone()));
        Ok(())
    }

    /// Public key encryption of pt.
    pub fn encrypt(&mut self, pt: &Plaintext) -> Result<Ciphertext> {
        pt.validate(&self.context)?;
        let mut ct: Ciphertext = self.encrypt_zero_public()?;
        let context: Arc<Context> = self.context.clone();
        add_scaled_plain(context.first_context_data(), pt, &mut ct.polys[0], false);
        Ok(ct)
    }

    /// Secret key encryption of pt.
    pub fn encrypt_symmetric(&mut self, pt: &Plaintext) -> Result<Ciphertext> {
        pt.validate(&self.context)?;
        let mut ct: Ciphertext = self.encrypt_zero_symmetric()?;
        let context: Arc<Context> = self.context.clone();
        add_scaled_plain(context.first_context_data(), pt, &mut ct.polys[0], false);
        Ok(ct)
    }

    /// Encryption of zero, with the public key if one is set.
    pub fn encrypt_zero(&mut self) -> Result<Ciphertext> {
        if self.public_key.is_some() {
            self.encrypt_zero_public()
        } else {
            self.encrypt_zero_symmetric()
        }
    }

    /// (pk0*u + e0, pk1*u + e1) at the key level, divided by the special prime
    /// when key switching is enabled.
    fn encrypt_zero_public(&mut self) -> Result<Ciphertext> {
        let context: Arc<Context> = self.context.clone();
        let pk: &PublicKey = self
            .public_key
            .as_ref()
            .ok_or_else(|| Error::UnsupportedOperation("no public key set".to_string()))?;

        let key_data: &ContextData = context.key_context_data();
        let ring: &RingRNS<u64> = key_data.ring();

        let mut u: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.fill_distribution(&Distribution::Ternary, &mut self.source_xu, &mut u);
        ring.ntt_inplace::<false>(&mut u);

        let mut e: PolyRNS<u64> = ring.new_polyrns();
        let polys: Vec<PolyRNS<u64>> = pk
            .polys
            .iter()
            .map(|pk_i| {
                let mut c: PolyRNS<u64> = ring.new_polyrns();
                ring.mul(pk_i, &u, &mut c);
                ring.intt_inplace::<false>(&mut c);
                ring.fill_distribution(&self.dist_xe, &mut self.source_xe, &mut e);
                ring.add_inplace::<ONCE>(&e, &mut c);
                if context.using_keyswitching() {
                    ring.div_round_by_last_modulus_inplace(&mut c);
                }
                c
            })
            .collect();

        let mut ct: Ciphertext = Ciphertext::new(context.first_context_data(), 2);
        ct.polys = polys;
        Ok(ct)
    }

    /// (-a*s + e, a) at the first data level.
    fn encrypt_zero_symmetric(&mut self) -> Result<Ciphertext> {
        let context: Arc<Context> = self.context.clone();
        let s: &SecretPoly = self
            .secret_key
            .as_ref()
            .ok_or_else(|| Error::UnsupportedOperation("no secret key set".to_string()))?;

        let data: &ContextData = context.first_context_data();
        let ring: &RingRNS<u64> = data.ring();

        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(&mut self.source_xa, &mut a);

        let mut a_s: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.ntt::<false>(&a, &mut a_s);
        ring.mul_inplace(s, &mut a_s);
        ring.intt_inplace::<false>(&mut a_s);

        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_distribution(&self.dist_xe, &mut self.source_xe, &mut c0);
        ring.sub_inplace::<ONCE>(&a_s, &mut c0);

        let mut ct: Ciphertext = Ciphertext::new(data, 2);
        ct.polys = vec![c0, a];
        Ok(ct)
    }
}
