use crate::utils::*;
use pallas::codec::minicbor::{self, Decoder, data::Type};
use std::collections::BTreeMap;
use tx_sanitizer_common::{Redeemers, WitnessSet};

fn redeemers(d: &mut Decoder<'_>) -> DecodeResult<Redeemers> {
    match d.datatype()? {
        Type::Map | Type::MapIndef => Ok(Redeemers::Map(raw_item(d)?)),
        _ => Ok(Redeemers::List(collection(d, raw_item)?)),
    }
}

pub fn witness_set(d: &mut Decoder<'_>) -> DecodeResult<WitnessSet> {
    let mut ws = WitnessSet::default();
    keyed_map(d, "witness set", |d, key| {
        match key {
            0 => ws.vkey_witnesses = Some(collection(d, raw_item)?),
            1 => ws.native_scripts = Some(collection(d, raw_item)?),
            2 => ws.bootstrap_witnesses = Some(collection(d, raw_item)?),
            3 => ws.plutus_v1_scripts = Some(collection(d, raw_item)?),
            4 => ws.plutus_data = Some(collection(d, raw_item)?),
            5 => ws.redeemers = Some(redeemers(d)?),
            6 => ws.plutus_v2_scripts = Some(collection(d, raw_item)?),
            7 => ws.plutus_v3_scripts = Some(collection(d, raw_item)?),
            _ => {
                return Err(minicbor::decode::Error::message(format!(
                    "unknown witness set key {key}"
                )));
            }
        }
        Ok(())
    })?;
    Ok(ws)
}

pub fn write_witness_set(e: &mut Enc, ws: &WitnessSet) -> Result<(), crate::EncodeError> {
    let mut entries = BTreeMap::new();

    let raw_fields = [
        (0, &ws.vkey_witnesses),
        (1, &ws.native_scripts),
        (2, &ws.bootstrap_witnesses),
        (3, &ws.plutus_v1_scripts),
        (4, &ws.plutus_data),
        (6, &ws.plutus_v2_scripts),
        (7, &ws.plutus_v3_scripts),
    ];
    for (key, field) in raw_fields {
        if let Some(c) = field {
            entries.insert(key, to_bytes(|e| write_collection(e, c, write_raw_item))?);
        }
    }

    match &ws.redeemers {
        Some(Redeemers::List(c)) => {
            entries.insert(5, to_bytes(|e| write_collection(e, c, write_raw_item))?);
        }
        Some(Redeemers::Map(raw)) => {
            entries.insert(5, raw.as_slice().to_vec());
        }
        None => {}
    }

    write_keyed_map(e, &entries).map_err(|err| crate::EncodeError(err.to_string()))
}
