//! Transaction payload.
//!
//! A single programmable transaction made of Move calls, paid for with the
//! sender's coins. Serialized with bincode; the bytes are what the ephemeral
//! key signs and what is submitted to the ledger.

use serde::{Deserialize, Serialize};
use zkvote_ledger::ObjectRef;
use zkvote_types::{AccountAddress, Epoch, ObjectId};

use crate::TxError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// A bincode-encoded plain value.
    Pure(Vec<u8>),
    Object(ObjectArg),
}

impl CallArg {
    pub fn pure<T: Serialize>(value: &T) -> Result<Self, TxError> {
        bincode::serialize(value)
            .map(CallArg::Pure)
            .map_err(|e| TxError::Build(format!("cannot encode argument: {e}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl ProgrammableTransaction {
    /// Append an input and return the argument referring to it.
    pub fn input(&mut self, arg: CallArg) -> Argument {
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    pub fn move_call(
        &mut self,
        package: ObjectId,
        module: &str,
        function: &str,
        arguments: Vec<Argument>,
    ) {
        self.commands
            .push(Command::MoveCall(Box::new(ProgrammableMoveCall {
                package,
                module: module.to_string(),
                function: function.to_string(),
                type_arguments: Vec::new(),
                arguments,
            })));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: AccountAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionExpiration {
    None,
    Epoch(Epoch),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub kind: TransactionKind,
    pub sender: AccountAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

impl TransactionData {
    /// bincode with its default configuration. This is not BCS; a ledger
    /// node must decode the same encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TxError> {
        bincode::serialize(self)
            .map_err(|e| TxError::Build(format!("cannot serialize transaction: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_indexed_in_order() {
        let mut ptb = ProgrammableTransaction::default();
        let a = ptb.input(CallArg::pure(&"axe").unwrap());
        let b = ptb.input(CallArg::pure(&66u64).unwrap());
        assert_eq!(a, Argument::Input(0));
        assert_eq!(b, Argument::Input(1));
    }

    #[test]
    fn pure_address_is_raw_32_bytes() {
        let addr = AccountAddress::new([7u8; 32]);
        match CallArg::pure(&addr).unwrap() {
            CallArg::Pure(bytes) => assert_eq!(bytes, vec![7u8; 32]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut ptb = ProgrammableTransaction::default();
        let arg = ptb.input(CallArg::pure(&1u64).unwrap());
        ptb.move_call(ObjectId::new([1u8; 32]), "m", "f", vec![arg]);
        let tx = TransactionData {
            kind: TransactionKind::ProgrammableTransaction(ptb),
            sender: AccountAddress::new([2u8; 32]),
            gas_data: GasData {
                payment: vec![],
                owner: AccountAddress::new([2u8; 32]),
                price: 1000,
                budget: 10_000_000,
            },
            expiration: TransactionExpiration::Epoch(5),
        };
        assert_eq!(tx.to_bytes().unwrap(), tx.clone().to_bytes().unwrap());
        let decoded: TransactionData = bincode::deserialize(&tx.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }
}
