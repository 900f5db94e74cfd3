use core::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A trait that defines how types are decoded/encoded.
pub trait Codec<'a> {
    type Type;
    type Encoded: AsRef<[u8]>;

    fn encode(d: &'a Self::Type) -> Option<Self::Encoded>;

    fn decode(bytes: &'a [u8]) -> Option<Self::Type>;
}

/// A JSON codec that uses `serde_json` to encode/decode as a JSON string
#[derive(Clone, Debug)]
pub struct JsonCodec<T>(PhantomData<T>);

impl<'a, T> Codec<'a> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Type = T;
    type Encoded = String;

    fn encode(d: &'a Self::Type) -> Option<Self::Encoded> {
        serde_json::to_string(d).ok()
    }

    fn decode(bytes: &'a [u8]) -> Option<Self::Type> {
        let json_string = String::from_utf8(bytes.to_vec()).ok()?;
        serde_json::from_str(&json_string).ok()
    }
}

/// A Protobuf codec that uses `prost` to encode/decode
#[derive(Clone, Debug)]
pub struct ProtobufCodec<T, R> {
    domain_type: PhantomData<T>,
    raw_type: PhantomData<R>,
}

impl<'a, T, R> Codec<'a> for ProtobufCodec<T, R>
where
    T: Into<R> + Clone,
    R: TryInto<T> + Default + prost::Message,
{
    type Type = T;
    type Encoded = Vec<u8>;

    fn encode(d: &'a Self::Type) -> Option<Self::Encoded> {
        let r = d.clone().into();
        Some(r.encode_to_vec())
    }

    fn decode(bytes: &'a [u8]) -> Option<Self::Type> {
        let r = R::decode(bytes).ok()?;
        r.try_into().ok()
    }
}
