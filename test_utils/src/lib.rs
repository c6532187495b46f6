//! Fixture builders producing canonical transaction CBOR for tests.
//!
//! Everything here is written with definite lengths and ascending map keys so that
//! decoding and re-encoding a fixture gives back the same bytes.

use pallas::codec::minicbor::{Encoder, data::Tag};

type Enc = Encoder<Vec<u8>>;

pub const OWNER_A: [u8; 28] = [0xa1; 28];
pub const OWNER_B: [u8; 28] = [0xb2; 28];
pub const OWNER_C: [u8; 28] = [0xc3; 28];

fn encoder() -> Enc {
    Encoder::new(Vec::new())
}

fn raw(e: &mut Enc, bytes: &[u8]) {
    e.writer_mut().extend_from_slice(bytes);
}

fn maybe_set_tag(e: &mut Enc, tagged: bool) {
    if tagged {
        e.tag(Tag::new(258)).unwrap();
    }
}

/// `[3, operator, vrf, pledge, cost, margin, reward_account, owners, relays, metadata]`
pub fn pool_registration_cbor(owners: &[[u8; 28]], tagged_owners: bool) -> Vec<u8> {
    let mut e = encoder();
    e.array(10).unwrap();
    e.u64(3).unwrap();
    e.bytes(&[0x0f; 28]).unwrap();
    e.bytes(&[0x5e; 32]).unwrap();
    e.u64(500_000_000).unwrap();
    e.u64(340_000_000).unwrap();
    // 30([1, 100])
    e.tag(Tag::new(30)).unwrap();
    e.array(2).unwrap().u64(1).unwrap().u64(100).unwrap();
    let mut reward_account = vec![0xe1];
    reward_account.extend_from_slice(&OWNER_A);
    e.bytes(&reward_account).unwrap();
    maybe_set_tag(&mut e, tagged_owners);
    e.array(owners.len() as u64).unwrap();
    for owner in owners {
        e.bytes(owner).unwrap();
    }
    // One single-host-name relay
    e.array(1).unwrap();
    e.array(3).unwrap().u64(1).unwrap().u64(3001).unwrap().str("relay.example.com").unwrap();
    e.array(2).unwrap();
    e.str("https://example.com/pool.json").unwrap();
    e.bytes(&[0x3d; 32]).unwrap();
    e.into_writer()
}

/// `[2, [0, keyhash], pool]`
pub fn stake_delegation_cbor(seed: u8) -> Vec<u8> {
    let mut e = encoder();
    e.array(3).unwrap().u64(2).unwrap();
    e.array(2).unwrap().u64(0).unwrap().bytes(&[seed; 28]).unwrap();
    e.bytes(&[0x0f; 28]).unwrap();
    e.into_writer()
}

/// `[vkey, signature]`
pub fn vkey_witness_cbor(seed: u8) -> Vec<u8> {
    let mut e = encoder();
    e.array(2).unwrap();
    e.bytes(&[seed; 32]).unwrap();
    e.bytes(&[seed; 64]).unwrap();
    e.into_writer()
}

/// `[address, coin]`
pub fn output_cbor(seed: u8, coin: u64) -> Vec<u8> {
    let mut address = vec![0x61];
    address.extend_from_slice(&[seed; 28]);
    let mut e = encoder();
    e.array(2).unwrap().bytes(&address).unwrap().u64(coin).unwrap();
    e.into_writer()
}

/// Wrap encoded parts into a four element transaction
pub fn tx_cbor(
    body: &[u8],
    witness_set: &[u8],
    is_valid: bool,
    auxiliary_data: Option<&[u8]>,
) -> Vec<u8> {
    let mut e = encoder();
    e.array(4).unwrap();
    raw(&mut e, body);
    raw(&mut e, witness_set);
    e.bool(is_valid).unwrap();
    match auxiliary_data {
        Some(aux) => raw(&mut e, aux),
        None => {
            e.null().unwrap();
        }
    }
    e.into_writer()
}

/// Builder for canonical test transactions
#[derive(Debug, Clone)]
pub struct TxFixture {
    pub inputs: Vec<([u8; 32], u64)>,
    pub tagged_inputs: bool,
    pub outputs: Vec<Vec<u8>>,
    pub fee: u64,
    pub certificates: Option<Vec<Vec<u8>>>,
    pub tagged_certificates: bool,
    pub collateral: Option<Vec<([u8; 32], u64)>>,
    pub required_signers: Option<Vec<[u8; 28]>>,
    pub other_fields: Vec<(u64, Vec<u8>)>,
    pub vkey_witnesses: Option<Vec<Vec<u8>>>,
    pub tagged_witnesses: bool,
    pub plutus_data: Option<Vec<Vec<u8>>>,
}

impl Default for TxFixture {
    fn default() -> Self {
        Self {
            inputs: vec![([0x01; 32], 0), ([0x02; 32], 1)],
            tagged_inputs: false,
            outputs: vec![output_cbor(0x71, 2_000_000), output_cbor(0x72, 1_500_000)],
            fee: 170_000,
            certificates: None,
            tagged_certificates: false,
            collateral: None,
            required_signers: None,
            other_fields: Vec::new(),
            vkey_witnesses: None,
            tagged_witnesses: false,
            plutus_data: None,
        }
    }
}

impl TxFixture {
    pub fn tagged_inputs(mut self, tagged: bool) -> Self {
        self.tagged_inputs = tagged;
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<([u8; 32], u64)>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<Vec<u8>>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_certificate(mut self, cert: Vec<u8>) -> Self {
        self.certificates.get_or_insert_with(Vec::new).push(cert);
        self
    }

    /// Pool registration owned by A, B and C
    pub fn with_pool_registration(self) -> Self {
        self.with_pool_owners(&[OWNER_A, OWNER_B, OWNER_C], false)
    }

    pub fn with_pool_owners(self, owners: &[[u8; 28]], tagged: bool) -> Self {
        self.with_certificate(pool_registration_cbor(owners, tagged))
    }

    /// Certificates key present with no entries
    pub fn with_empty_certificates(mut self) -> Self {
        self.certificates = Some(Vec::new());
        self
    }

    pub fn tagged_certificates(mut self, tagged: bool) -> Self {
        self.tagged_certificates = tagged;
        self
    }

    pub fn with_collateral(mut self, collateral: Vec<([u8; 32], u64)>) -> Self {
        self.collateral = Some(collateral);
        self
    }

    pub fn with_required_signers(mut self, signers: Vec<[u8; 28]>) -> Self {
        self.required_signers = Some(signers);
        self
    }

    /// Extra body key, value given as encoded CBOR
    pub fn with_other_field(mut self, key: u64, value: Vec<u8>) -> Self {
        self.other_fields.push((key, value));
        self
    }

    /// `count` distinct key witnesses; zero gives a present but empty field
    pub fn with_vkey_witnesses(mut self, count: u8) -> Self {
        self.vkey_witnesses = Some((0..count).map(|i| vkey_witness_cbor(0x40 + i)).collect());
        self
    }

    pub fn with_vkey_witness_items(mut self, items: Vec<Vec<u8>>) -> Self {
        self.vkey_witnesses = Some(items);
        self
    }

    pub fn tagged_witnesses(mut self, tagged: bool) -> Self {
        self.tagged_witnesses = tagged;
        self
    }

    pub fn with_plutus_data(mut self, items: Vec<Vec<u8>>) -> Self {
        self.plutus_data = Some(items);
        self
    }

    pub fn cbor(&self) -> Vec<u8> {
        tx_cbor(&body_cbor(self), &witness_set_cbor(self), true, None)
    }

    pub fn cbor_hex(&self) -> String {
        hex::encode(self.cbor())
    }
}

fn write_inputs(e: &mut Enc, inputs: &[([u8; 32], u64)], tagged: bool) {
    maybe_set_tag(e, tagged);
    e.array(inputs.len() as u64).unwrap();
    for (id, index) in inputs {
        e.array(2).unwrap().bytes(id).unwrap().u64(*index).unwrap();
    }
}

fn write_items(e: &mut Enc, items: &[Vec<u8>], tagged: bool) {
    maybe_set_tag(e, tagged);
    e.array(items.len() as u64).unwrap();
    for item in items {
        raw(e, item);
    }
}

/// Canonical body map for a fixture
pub fn body_cbor(f: &TxFixture) -> Vec<u8> {
    let mut other_fields = f.other_fields.clone();
    other_fields.sort_by_key(|(key, _)| *key);

    let len = 3
        + f.certificates.is_some() as u64
        + f.collateral.is_some() as u64
        + f.required_signers.is_some() as u64
        + other_fields.len() as u64;

    let mut e = encoder();
    e.map(len).unwrap();

    e.u64(0).unwrap();
    write_inputs(&mut e, &f.inputs, f.tagged_inputs);
    e.u64(1).unwrap();
    write_items(&mut e, &f.outputs, false);
    e.u64(2).unwrap().u64(f.fee).unwrap();

    if let Some(certs) = &f.certificates {
        e.u64(4).unwrap();
        write_items(&mut e, certs, f.tagged_certificates);
    }
    if let Some(collateral) = &f.collateral {
        e.u64(13).unwrap();
        write_inputs(&mut e, collateral, false);
    }
    if let Some(signers) = &f.required_signers {
        e.u64(14).unwrap();
        e.array(signers.len() as u64).unwrap();
        for signer in signers {
            e.bytes(signer).unwrap();
        }
    }
    for (key, value) in &other_fields {
        e.u64(*key).unwrap();
        raw(&mut e, value);
    }
    e.into_writer()
}

/// Canonical witness set map for a fixture
pub fn witness_set_cbor(f: &TxFixture) -> Vec<u8> {
    let len = f.vkey_witnesses.is_some() as u64 + f.plutus_data.is_some() as u64;
    let mut e = encoder();
    e.map(len).unwrap();
    if let Some(items) = &f.vkey_witnesses {
        e.u64(0).unwrap();
        write_items(&mut e, items, f.tagged_witnesses);
    }
    if let Some(items) = &f.plutus_data {
        e.u64(4).unwrap();
        write_items(&mut e, items, f.tagged_witnesses);
    }
    e.into_writer()
}
