//! Binary encoding of parameters, plaintexts, ciphertexts and keys.
//!
//! Every object starts with the header
//!
//! | bytes | content                         |
//! |-------|---------------------------------|
//! | 4     | magic `BFVL`                    |
//! | 1     | format version                  |
//! | 1     | object kind                     |
//! | 1     | scheme byte                     |
//!
//! followed by its body. All integers are little-endian u64. Objects tied to
//! a level carry its 32-byte fingerprint, the degree, the number of RNS
//! residues and the number of polynomials before the raw residues.
//!
//! Loading checks the scheme ([Error::SchemeMismatch]), that the fingerprint
//! is a level of the receiving context and that dimensions and residues agree
//! with it ([Error::ParmsMismatch]). A malformed header is an [Error::Io] of
//! kind [std::io::ErrorKind::InvalidData].

use crate::ciphertext::Ciphertext;
use crate::context::{Context, ContextData, MAX_COEFF_MODULUS_COUNT, MAX_MULTIPLY_OPERAND_SIZE, MAX_POLY_MODULUS_DEGREE};
use crate::error::{Error, Result};
use crate::keys::{GaloisKeys, KSwitchKey, PublicKey, RelinKeys, SecretKey, SecretPoly};
use crate::parameters::{ParameterSet, ParmsId, SchemeType};
use crate::plaintext::Plaintext;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use math::automorphism::is_valid_galois_element;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use std::io::{self, Read, Write};
use utils::map::Map;

const MAGIC: [u8; 4] = *b"BFVL";
const VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Kind {
    Parameters = 1,
    Plaintext = 2,
    Ciphertext = 3,
    SecretKey = 4,
    PublicKey = 5,
    RelinKeys = 6,
    GaloisKeys = 7,
}

/// Serializes an object to a byte stream.
pub trait WriterTo {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

/// Deserializes an object produced by [WriterTo], validating it against context.
pub trait ReaderFrom: Sized {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self>;
}

fn invalid_data(msg: String) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, msg))
}

fn write_header<W: Write>(writer: &mut W, kind: Kind, scheme: SchemeType) -> io::Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_u8(VERSION)?;
    writer.write_u8(kind as u8)?;
    writer.write_u8(scheme as u8)
}

fn read_header<R: Read>(reader: &mut R, kind: Kind) -> Result<()> {
    let mut magic: [u8; 4] = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(invalid_data(format!("invalid magic {:?}", magic)));
    }
    let version: u8 = reader.read_u8()?;
    if version != VERSION {
        return Err(invalid_data(format!("unsupported version {}", version)));
    }
    let found: u8 = reader.read_u8()?;
    if found != kind as u8 {
        return Err(invalid_data(format!("expected a {:?}, found kind {}", kind, found)));
    }
    let scheme: u8 = reader.read_u8()?;
    if SchemeType::from_byte(scheme) != Some(SchemeType::Bfv) {
        return Err(Error::SchemeMismatch {
            expected: SchemeType::Bfv,
            found: scheme,
        });
    }
    Ok(())
}

fn read_len<R: Read>(reader: &mut R, what: &str, max: usize) -> Result<usize> {
    let len: u64 = reader.read_u64::<LittleEndian>()?;
    if len > max as u64 {
        return Err(Error::ParmsMismatch(format!("{} {} exceeds {}", what, len, max)));
    }
    Ok(len as usize)
}

fn read_parms_id<R: Read>(reader: &mut R) -> Result<ParmsId> {
    let mut id: ParmsId = ParmsId::ZERO;
    reader.read_exact(&mut id.0)?;
    Ok(id)
}

/// Writes fingerprint, degree, residue count and polynomial count.
fn write_shape<W: Write>(writer: &mut W, parms_id: &ParmsId, n: usize, rns: usize, count: usize) -> io::Result<()> {
    writer.write_all(&parms_id.0)?;
    writer.write_u64::<LittleEndian>(n as u64)?;
    writer.write_u64::<LittleEndian>(rns as u64)?;
    writer.write_u64::<LittleEndian>(count as u64)
}

/// Reads the shape written by [write_shape], checks it against the level of
/// the fingerprint and returns that level with the polynomial count.
fn read_shape<'a, R: Read>(context: &'a Context, reader: &mut R, max_count: usize) -> Result<(&'a ContextData, usize)> {
    let parms_id: ParmsId = read_parms_id(reader)?;
    let data: &ContextData = context.context_data_or_err(&parms_id)?;
    let n: usize = read_len(reader, "degree", MAX_POLY_MODULUS_DEGREE)?;
    let rns: usize = read_len(reader, "residue count", MAX_COEFF_MODULUS_COUNT)?;
    let count: usize = read_len(reader, "polynomial count", max_count)?;
    // Empty collections carry no dimensions.
    if count > 0 && (n != data.n() || rns != data.coeff_modulus_count()) {
        return Err(Error::ParmsMismatch(format!(
            "shape (n={}, residues={}) does not match level {} (n={}, residues={})",
            n,
            rns,
            parms_id,
            data.n(),
            data.coeff_modulus_count()
        )));
    }
    Ok((data, count))
}

fn write_poly<W: Write>(writer: &mut W, poly: &PolyRNS<u64>) -> io::Result<()> {
    for residue in poly.0.iter() {
        for &x in residue.0.iter() {
            writer.write_u64::<LittleEndian>(x)?;
        }
    }
    Ok(())
}

/// Reads a polynomial of ring, rejecting residues that are not reduced.
fn read_poly<R: Read>(ring: &RingRNS<u64>, reader: &mut R) -> Result<PolyRNS<u64>> {
    let mut poly: PolyRNS<u64> = ring.new_polyrns();
    for (r, residue) in ring.rings.iter().zip(poly.0.iter_mut()) {
        reader.read_u64_into::<LittleEndian>(&mut residue.0)?;
        let q: u64 = r.q();
        if let Some(x) = residue.0.iter().find(|&&x| x >= q) {
            return Err(Error::ParmsMismatch(format!("residue {} is not reduced modulo {}", x, q)));
        }
    }
    Ok(poly)
}

fn write_kswitch_key<W: Write>(writer: &mut W, key: &KSwitchKey) -> io::Result<()> {
    writer.write_u64::<LittleEndian>(key.keys.len() as u64)?;
    for pair in key.keys.iter() {
        write_poly(writer, &pair[0])?;
        write_poly(writer, &pair[1])?;
    }
    Ok(())
}

fn read_kswitch_key<R: Read>(data: &ContextData, reader: &mut R) -> Result<KSwitchKey> {
    let count: usize = read_len(reader, "decomposition count", MAX_COEFF_MODULUS_COUNT)?;
    if count + 1 != data.coeff_modulus_count() {
        return Err(Error::ParmsMismatch(format!(
            "key switching key has {} components, expected {}",
            count,
            data.coeff_modulus_count().saturating_sub(1)
        )));
    }
    let ring: &RingRNS<u64> = data.ring();
    let keys: Vec<[PolyRNS<u64>; 2]> = (0..count)
        .map(|_| Ok([read_poly(ring, reader)?, read_poly(ring, reader)?]))
        .collect::<Result<Vec<_>>>()?;
    Ok(KSwitchKey {
        keys,
        parms_id: *data.parms_id(),
    })
}

/// Fails with ParmsMismatch unless data is the key level of context.
fn check_key_level(context: &Context, data: &ContextData) -> Result<()> {
    if data.parms_id() != context.key_parms_id() {
        return Err(Error::ParmsMismatch(format!(
            "keys must be at the key level {}, found {}",
            context.key_parms_id(),
            data.parms_id()
        )));
    }
    Ok(())
}

impl WriterTo for ParameterSet {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::Parameters, self.scheme())?;
        writer.write_u64::<LittleEndian>(self.poly_modulus_degree() as u64)?;
        writer.write_u64::<LittleEndian>(self.coeff_modulus().len() as u64)?;
        for &q in self.coeff_modulus() {
            writer.write_u64::<LittleEndian>(q)?;
        }
        writer.write_u64::<LittleEndian>(self.plain_modulus())
    }
}

impl ParameterSet {
    /// Parameter sets do not depend on a context. The result is not
    /// validated: pass it to [Context::create].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::Parameters)?;
        let n: usize = read_len(reader, "degree", MAX_POLY_MODULUS_DEGREE)?;
        let count: usize = read_len(reader, "prime count", MAX_COEFF_MODULUS_COUNT)?;
        let mut coeff_modulus: Vec<u64> = vec![0u64; count];
        reader.read_u64_into::<LittleEndian>(&mut coeff_modulus)?;
        let t: u64 = reader.read_u64::<LittleEndian>()?;
        Ok(ParameterSet::new(SchemeType::Bfv)
            .with_poly_modulus_degree(n)
            .with_coeff_modulus(coeff_modulus)
            .with_plain_modulus(t))
    }
}

impl WriterTo for Plaintext {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::Plaintext, SchemeType::Bfv)?;
        let coeffs: &[u64] = &self.coeffs()[..self.significant_coeff_count()];
        writer.write_u64::<LittleEndian>(coeffs.len() as u64)?;
        for &c in coeffs {
            writer.write_u64::<LittleEndian>(c)?;
        }
        Ok(())
    }
}

impl ReaderFrom for Plaintext {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::Plaintext)?;
        let count: usize = read_len(reader, "coefficient count", context.n())?;
        let mut coeffs: Vec<u64> = vec![0u64; count];
        reader.read_u64_into::<LittleEndian>(&mut coeffs)?;
        let pt: Plaintext = Plaintext::new(coeffs);
        pt.validate(context)
            .map_err(|e| Error::ParmsMismatch(e.to_string()))?;
        Ok(pt)
    }
}

impl WriterTo for Ciphertext {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::Ciphertext, SchemeType::Bfv)?;
        write_shape(writer, self.parms_id(), self.poly_modulus_degree(), self.coeff_modulus_count(), self.size())?;
        self.polys.iter().try_for_each(|p| write_poly(writer, p))
    }
}

impl ReaderFrom for Ciphertext {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::Ciphertext)?;
        let (data, size) = read_shape(context, reader, 2 * MAX_MULTIPLY_OPERAND_SIZE)?;
        if size < 2 {
            return Err(Error::ParmsMismatch(format!("ciphertext size {} is below 2", size)));
        }
        let polys: Vec<PolyRNS<u64>> = (0..size)
            .map(|_| read_poly(data.ring(), reader))
            .collect::<Result<Vec<_>>>()?;
        let mut ct: Ciphertext = Ciphertext::new(data, size);
        ct.polys = polys;
        Ok(ct)
    }
}

impl WriterTo for SecretKey {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::SecretKey, SchemeType::Bfv)?;
        write_shape(writer, self.parms_id(), self.poly.n(), self.poly.level() + 1, 1)?;
        write_poly(writer, &self.poly)
    }
}

impl ReaderFrom for SecretKey {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::SecretKey)?;
        let (data, count) = read_shape(context, reader, 1)?;
        check_key_level(context, data)?;
        if count != 1 {
            return Err(Error::ParmsMismatch(format!("secret key has {} polynomials", count)));
        }
        Ok(SecretKey {
            poly: SecretPoly(read_poly(data.ring(), reader)?),
            parms_id: *data.parms_id(),
        })
    }
}

impl WriterTo for PublicKey {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::PublicKey, SchemeType::Bfv)?;
        let poly: &PolyRNS<u64> = &self.polys[0];
        write_shape(writer, self.parms_id(), poly.n(), poly.level() + 1, 2)?;
        self.polys.iter().try_for_each(|p| write_poly(writer, p))
    }
}

impl ReaderFrom for PublicKey {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::PublicKey)?;
        let (data, count) = read_shape(context, reader, 2)?;
        check_key_level(context, data)?;
        if count != 2 {
            return Err(Error::ParmsMismatch(format!("public key has {} polynomials", count)));
        }
        Ok(PublicKey {
            polys: [read_poly(data.ring(), reader)?, read_poly(data.ring(), reader)?],
            parms_id: *data.parms_id(),
        })
    }
}

impl WriterTo for RelinKeys {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::RelinKeys, SchemeType::Bfv)?;
        let poly: &PolyRNS<u64> = &self.0.keys[0][0];
        write_shape(writer, self.parms_id(), poly.n(), poly.level() + 1, 1)?;
        write_kswitch_key(writer, &self.0)
    }
}

impl ReaderFrom for RelinKeys {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::RelinKeys)?;
        let (data, count) = read_shape(context, reader, 1)?;
        check_key_level(context, data)?;
        if count != 1 {
            return Err(Error::ParmsMismatch(format!("relinearization keys hold {} keys", count)));
        }
        Ok(RelinKeys(read_kswitch_key(data, reader)?))
    }
}

impl WriterTo for GaloisKeys {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_header(writer, Kind::GaloisKeys, SchemeType::Bfv)?;
        let elts: Vec<usize> = self.galois_elts();
        let (n, rns) = match elts.first().and_then(|&elt| self.key(elt)) {
            Some(key) => (key.keys[0][0].n(), key.keys[0][0].level() + 1),
            None => (0, 0),
        };
        write_shape(writer, self.parms_id(), n, rns, elts.len())?;
        for elt in elts {
            writer.write_u64::<LittleEndian>(elt as u64)?;
            if let Some(key) = self.key(elt) {
                write_kswitch_key(writer, key)?;
            }
        }
        Ok(())
    }
}

impl ReaderFrom for GaloisKeys {
    fn read_from<R: Read>(context: &Context, reader: &mut R) -> Result<Self> {
        read_header(reader, Kind::GaloisKeys)?;
        let n: usize = context.n();
        let (data, count) = read_shape(context, reader, n)?;
        check_key_level(context, data)?;
        let mut keys: Map<usize, KSwitchKey> = Map::new();
        for _ in 0..count {
            let elt: usize = reader.read_u64::<LittleEndian>()? as usize;
            if !is_valid_galois_element(n, elt) || keys.contains_key(&elt) {
                return Err(Error::ParmsMismatch(format!("invalid Galois element {}", elt)));
            }
            keys.insert(elt, read_kswitch_key(data, reader)?);
        }
        Ok(GaloisKeys {
            keys,
            parms_id: *data.parms_id(),
        })
    }
}
