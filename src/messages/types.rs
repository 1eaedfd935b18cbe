/// Media type of a DIDComm envelope, carried as the `typ` protected header
/// of the outermost rendered layer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    #[serde(rename = "application/didcomm-encrypted+json")]
    DidCommJwe,
    #[serde(rename = "application/didcomm-signed+json")]
    DidCommJws,
    #[serde(rename = "application/didcomm-plain+json")]
    DidCommRaw,
}
