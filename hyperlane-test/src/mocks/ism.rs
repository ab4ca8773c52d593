#![allow(non_snake_case)]

use mockall::*;

use hyperlane_core::*;

mock! {
    pub InterchainSecurityModule {
        pub fn _address(&self) -> H256 {}

        pub fn _module_type(&self) -> ModuleType {}

        pub fn _verify(
            &self,
            ctx: &CallContext,
            metadata: &[u8],
            message: &HyperlaneMessage,
        ) -> IsmResult<bool> {}
    }
}

impl std::fmt::Debug for MockInterchainSecurityModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockInterchainSecurityModule")
    }
}

impl HyperlaneContract for MockInterchainSecurityModule {
    fn address(&self) -> H256 {
        self._address()
    }
}

impl InterchainSecurityModule for MockInterchainSecurityModule {
    fn module_type(&self) -> ModuleType {
        self._module_type()
    }

    fn verify(
        &self,
        ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        self._verify(ctx, metadata, message)
    }
}

impl MockInterchainSecurityModule {
    /// A mock deployed at `address` that answers every verify with `result`
    /// and expects to be called exactly `times` times.
    pub fn returning(address: H256, result: IsmResult<bool>, times: usize) -> Self {
        let mut ism = MockInterchainSecurityModule::new();
        ism.expect__address().return_const(address);
        ism.expect__module_type().return_const(ModuleType::Null);
        ism.expect__verify()
            .times(times)
            .returning(move |_, _, _| result.clone());
        ism
    }
}
