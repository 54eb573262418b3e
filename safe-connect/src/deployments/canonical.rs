//! Built-in deployment tables.
//!
//! The canonical table mirrors the official singleton deployments for the
//! networks this crate ships with; additional chains are reached through the
//! fallback table or configuration.

use alloy_primitives::{Address, address};

use super::{ContractAddressSet, VersionFamily};

/// One official release of the singleton for one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Release version, e.g. `"1.3.0"`.
    pub version: &'static str,
    /// Interface family of the singleton.
    pub family: VersionFamily,
    /// Singleton and helpers of the release.
    pub contracts: ContractAddressSet,
    /// Chains the release is deployed on at these addresses.
    pub networks: &'static [&'static str],
}

const LEGACY_NETWORKS: &[&str] = &["1", "100", "137"];

const CANONICAL_NETWORKS: &[&str] = &[
    "1", "10", "56", "100", "137", "8453", "42161", "43114", "84532", "11155111",
];

const fn helpers_v1_3_0(singleton: Address) -> ContractAddressSet {
    ContractAddressSet {
        singleton_address: singleton,
        proxy_factory_address: Some(address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2")),
        fallback_handler_address: Some(address!("f48f2B2d2a534e402487b3ee7C18c33Aec0Fe5e4")),
        multi_send_address: Some(address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761")),
        multi_send_call_only_address: Some(address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D")),
        sign_message_lib_address: Some(address!("A65387F16B013cf2Af4605Ad8aA5ec25a2cbA3a2")),
        create_call_address: Some(address!("7cbB62EaA69F79e6873cD1ecB2392971036cFAa4")),
        simulate_tx_accessor_address: Some(address!("59AD6735bCd8152B84860Cb256dD9e96b85F69Da")),
    }
}

const fn helpers_v1_4_1(singleton: Address) -> ContractAddressSet {
    ContractAddressSet {
        singleton_address: singleton,
        proxy_factory_address: Some(address!("4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67")),
        fallback_handler_address: Some(address!("fd0732Dc9E303f09fCEf3a7388Ad10A83459Ec99")),
        multi_send_address: Some(address!("38869bf66a61cF6bDB996A6aE40D5853Fd43B526")),
        multi_send_call_only_address: Some(address!("9641d764fc13c8B624c04430C7356C1C7C8102e2")),
        sign_message_lib_address: Some(address!("d53cd0aB83D845Ac265BE939c57F53AD838012c9")),
        create_call_address: Some(address!("9b35Af71d77eaf8d7e40252370304687390A1A52")),
        simulate_tx_accessor_address: Some(address!("3d4BA2E0884aa488718476ca2FB8Efc291A46199")),
    }
}

const fn legacy(singleton: Address, proxy_factory: Address) -> ContractAddressSet {
    let mut set = ContractAddressSet::singleton_only(singleton);
    set.proxy_factory_address = Some(proxy_factory);
    set
}

/// Official releases, oldest first.
pub const CANONICAL: &[Deployment] = &[
    Deployment {
        version: "1.0.0",
        family: VersionFamily::Legacy,
        contracts: legacy(
            address!("b6029EA3B2c51D09a50B53CA8012FeEB05bDa35A"),
            address!("12302fE9c02ff50939BaAaaf415fc226C078613C"),
        ),
        networks: LEGACY_NETWORKS,
    },
    Deployment {
        version: "1.1.1",
        family: VersionFamily::Legacy,
        contracts: legacy(
            address!("34CfAC646f301356fAa8B21e94227e3583Fe3F5F"),
            address!("76E2cFc1F5Fa8F6a5b3fC4c8F4788F0116861F9B"),
        ),
        networks: LEGACY_NETWORKS,
    },
    Deployment {
        version: "1.2.0",
        family: VersionFamily::Legacy,
        contracts: legacy(
            address!("6851D6fDFAfD08c0295C392436245E5bc78B0185"),
            address!("76E2cFc1F5Fa8F6a5b3fC4c8F4788F0116861F9B"),
        ),
        networks: LEGACY_NETWORKS,
    },
    Deployment {
        version: "1.3.0",
        family: VersionFamily::Legacy,
        contracts: helpers_v1_3_0(address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552")),
        networks: CANONICAL_NETWORKS,
    },
    Deployment {
        version: "1.3.0",
        family: VersionFamily::LayeredL2,
        contracts: helpers_v1_3_0(address!("3E5c63644E683549055b9Be8653de26E0B4CD36E")),
        networks: CANONICAL_NETWORKS,
    },
    Deployment {
        version: "1.4.1",
        family: VersionFamily::Legacy,
        contracts: helpers_v1_4_1(address!("41675C099F32341bf84BFc5382aF534df5C7461a")),
        networks: CANONICAL_NETWORKS,
    },
    Deployment {
        version: "1.4.1",
        family: VersionFamily::LayeredL2,
        contracts: helpers_v1_4_1(address!("29fcB43b46531BcA003ddC8FCB67FFE91900C762")),
        networks: CANONICAL_NETWORKS,
    },
];

/// Version the fallback deployments were provisioned with.
pub const FALLBACK_VERSION: &str = "1.4.1";

/// Chains without an official deployment, with the L2 singleton and helpers
/// provisioned on them.
pub const FALLBACK: &[(&str, ContractAddressSet)] = &[
    (
        "560000",
        ContractAddressSet {
            singleton_address: address!("26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582"),
            proxy_factory_address: Some(address!("0b09bda80A011073ea460A352ec9396D8C683902")),
            fallback_handler_address: Some(address!("a1d7792Fdd620246330383868e811916Ef3d0ba5")),
            multi_send_address: Some(address!("87405963a42c8B078Cc15ced44b8d44BD23f1c3B")),
            multi_send_call_only_address: Some(address!("C39A8220Ac4EAA811E4378663322Ec64396De0c5")),
            sign_message_lib_address: Some(address!("33AE7D25F283fc461Ae5713774D579faf935D8B7")),
            create_call_address: Some(address!("dAa7CB84cFf22481306b079088716013bf69A0a5")),
            simulate_tx_accessor_address: Some(address!("d2dBE2ec98A60Da8f33159314dF11EAF8d7E08Ba")),
        },
    ),
    (
        "565000",
        ContractAddressSet {
            singleton_address: address!("279caD2eA77c124e5c65091333E9c3FfE1ee5aCf"),
            proxy_factory_address: Some(address!("a812FaE86c9d12E90daaD723BDb45e2bd7C6768B")),
            fallback_handler_address: Some(address!("18124e6926F529cd7B994704d2BF4ed6FCbB9d6C")),
            multi_send_address: Some(address!("3c6449611F1Fc8d9Fa1b31518dDa905e21964708")),
            multi_send_call_only_address: Some(address!("d3199A49C2889F8742b4A5Dcd79FfCf6F334Fd0a")),
            sign_message_lib_address: Some(address!("5671A4892a43b47d3534f4423f96F53f59Ae18BD")),
            create_call_address: Some(address!("9a120428267Cfa508087cca498610237174221c5")),
            simulate_tx_accessor_address: Some(address!("62fBfdD30c4E8820e4aaf07C8957a361dfaAdecB")),
        },
    ),
];
