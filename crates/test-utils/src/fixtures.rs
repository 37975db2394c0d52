//! Typed data documents shared by the tests.

use serde_json::{Value, json};

/// Wallet address used by [`person_wallet`].
pub const WALLET: &str = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826";

/// A `Person` holding a single wallet address.
pub fn person_wallet() -> Value {
    json!({
        "types": {
            "EIP712Domain": [{ "name": "name", "type": "string" }],
            "Person": [{ "name": "wallet", "type": "address" }]
        },
        "primaryType": "Person",
        "domain": { "name": "Test" },
        "message": { "wallet": WALLET }
    })
}

/// A `uint256[]` with three elements: a small number, a number above `u64::MAX` and a hex string.
pub fn uint_array() -> Value {
    serde_json::from_str(
        r#"{
            "types": {
                "EIP712Domain": [{ "name": "name", "type": "string" }],
                "Numbers": [{ "name": "values", "type": "uint256[]" }]
            },
            "primaryType": "Numbers",
            "domain": { "name": "Numbers" },
            "message": {
                "values": [
                    1,
                    115792089237316195423570985008687907853269984665640564039457584007913129639935,
                    "0x03"
                ]
            }
        }"#,
    )
    .expect("invalid fixture")
}

/// The mail example from EIP-712.
pub fn ether_mail() -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" }
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person" },
                { "name": "contents", "type": "string" }
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "contents": "Hello, Bob!"
        }
    })
}

/// A mail sent to several recipients with a fixed number of tags.
///
/// Exercises struct arrays, fixed arrays and nested arrays.
pub fn group_mail() -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "chainId", "type": "uint256" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallets", "type": "address[]" }
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person[]" },
                { "name": "tags", "type": "bytes4[2]" },
                { "name": "grid", "type": "int8[][]" }
            ]
        },
        "primaryType": "Mail",
        "domain": { "name": "Group Mail", "chainId": 1 },
        "message": {
            "from": { "name": "Cow", "wallets": ["0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"] },
            "to": [
                { "name": "Bob", "wallets": [] },
                {
                    "name": "Dan",
                    "wallets": [
                        "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB",
                        "0xB0B0b0b0b0b0B000000000000000000000000000"
                    ]
                }
            ],
            "tags": ["0x01020304", "0xdeadbeef"],
            "grid": [[-1, 2], [], [127]]
        }
    })
}

/// A document whose message references a type missing from the dictionary.
pub fn missing_type() -> Value {
    json!({
        "types": {
            "EIP712Domain": [{ "name": "name", "type": "string" }],
            "Order": [{ "name": "maker", "type": "Trader" }]
        },
        "primaryType": "Order",
        "domain": { "name": "Exchange" },
        "message": { "maker": { "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" } }
    })
}
