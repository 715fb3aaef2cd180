use serde::{Deserialize, Serialize};

use crate::error::DxrError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "param")]
struct Param {
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename = "params")]
struct Params {
    #[serde(rename = "param", default)]
    params: Vec<Param>,
}

impl Params {
    fn from_values(values: Vec<Value>) -> Params {
        Params {
            params: values.into_iter().map(|value| Param { value }).collect(),
        }
    }

    fn into_values(self) -> Vec<Value> {
        self.params.into_iter().map(|p| p.value).collect()
    }
}

/// The `<methodCall>` envelope: a method name plus its positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "methodCall")]
pub struct MethodCall {
    #[serde(rename = "methodName")]
    method_name: String,
    #[serde(default)]
    params: Params,
}

impl MethodCall {
    /// Construct a method call from a method name and a list of parameters.
    pub fn new(method_name: String, params: Vec<Value>) -> MethodCall {
        MethodCall {
            method_name,
            params: Params::from_values(params),
        }
    }

    /// The method name being called.
    pub fn name(&self) -> &str {
        &self.method_name
    }

    /// The call's positional parameters.
    pub fn params(&self) -> Vec<Value> {
        self.params.params.iter().map(|p| p.value.clone()).collect()
    }
}

/// The `<methodResponse>` envelope around a successful call's return values.
///
/// Per the XML-RPC spec a response always carries exactly one `<param>`; a
/// multicall-style batch response wraps several return values in a single
/// `<array>` value instead of using multiple params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "methodResponse")]
pub struct MethodResponse {
    params: Params,
}

impl MethodResponse {
    /// Wrap a single return value as a method response.
    pub fn new(value: Value) -> MethodResponse {
        MethodResponse {
            params: Params::from_values(vec![value]),
        }
    }

    /// The response's values, in order (normally exactly one).
    pub fn into_inner(self) -> Vec<Value> {
        self.params.into_values()
    }

    /// The response's single value.
    ///
    /// # Errors
    /// Returns [`DxrError::ParameterMismatch`] if the response did not carry
    /// exactly one `<param>`.
    pub fn inner(&self) -> Result<Value, DxrError> {
        match self.params.params.as_slice() {
            [param] => Ok(param.value.clone()),
            other => Err(DxrError::parameter_mismatch(1, other.len())),
        }
    }
}

/// A call, paired with the return type the caller expects.
///
/// `P` and `R` only exist to carry type information through [`TryToParams`]
/// and [`TryFromValue`] at the call site; the wire format is unaffected.
#[derive(Debug, Clone)]
pub struct Call<'a, P, R> {
    method_name: String,
    params: P,
    _marker: std::marker::PhantomData<(&'a (), R)>,
}

impl<'a, P, R> Call<'a, P, R>
where
    P: TryToParams,
    R: TryFromValue,
{
    /// Construct a call from a method name and parameters.
    pub fn new(method_name: String, params: P) -> Call<'a, P, R> {
        Call {
            method_name,
            params,
            _marker: std::marker::PhantomData,
        }
    }

    /// Encode this call as a [`MethodCall`].
    pub fn as_xml_rpc(&self) -> Result<MethodCall, DxrError> {
        Ok(MethodCall::new(self.method_name.clone(), self.params.try_to_params()?))
    }
}

/// Conversion from a typed tuple/value to a list of XML-RPC call parameters.
pub trait TryToParams {
    /// Convert `self` into the positional parameter list for a method call.
    fn try_to_params(&self) -> Result<Vec<Value>, DxrError>;
}

/// Conversion from an XML-RPC [`Value`] to a typed Rust value.
pub trait TryFromValue: Sized {
    /// Convert an XML-RPC value into `Self`.
    fn try_from_value(value: &Value) -> Result<Self, DxrError>;
}

/// Conversion from a Rust value into an XML-RPC [`Value`].
pub trait ToDXR {
    /// Convert `self` into an XML-RPC value.
    fn to_dxr(&self) -> Result<Value, DxrError>;
}

macro_rules! impl_try_to_params_single {
    ($t:ty) => {
        impl TryToParams for $t {
            fn try_to_params(&self) -> Result<Vec<Value>, DxrError> {
                Ok(vec![self.to_dxr()?])
            }
        }
    };
}

impl ToDXR for i32 {
    fn to_dxr(&self) -> Result<Value, DxrError> {
        Ok(Value::i4(*self))
    }
}

impl ToDXR for bool {
    fn to_dxr(&self) -> Result<Value, DxrError> {
        Ok(Value::boolean(*self))
    }
}

impl ToDXR for String {
    fn to_dxr(&self) -> Result<Value, DxrError> {
        Ok(Value::string(self.clone()))
    }
}

impl ToDXR for &str {
    fn to_dxr(&self) -> Result<Value, DxrError> {
        Ok(Value::string((*self).to_owned()))
    }
}

impl ToDXR for f64 {
    fn to_dxr(&self) -> Result<Value, DxrError> {
        Ok(Value::double(*self))
    }
}

impl_try_to_params_single!(i32);
impl_try_to_params_single!(bool);
impl_try_to_params_single!(String);
impl_try_to_params_single!(&str);
impl_try_to_params_single!(f64);

impl TryToParams for () {
    fn try_to_params(&self) -> Result<Vec<Value>, DxrError> {
        Ok(vec![])
    }
}

impl TryFromValue for i32 {
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        value.as_i4()
    }
}

impl TryFromValue for bool {
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        value.as_boolean()
    }
}

impl TryFromValue for String {
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        value.as_string().map(str::to_owned)
    }
}

impl TryFromValue for f64 {
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        value.as_double()
    }
}

impl TryFromValue for Value {
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        Ok(value.clone())
    }
}

impl<T> TryFromValue for Vec<T>
where
    T: TryFromValue,
{
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        value.as_array()?.elements().iter().map(T::try_from_value).collect()
    }
}

impl TryFromValue for std::collections::HashMap<String, Value> {
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        Ok(value
            .as_struct()?
            .members()
            .iter()
            .map(|m| (m.name().to_owned(), m.inner().clone()))
            .collect())
    }
}

impl<A> TryFromValue for (A,)
where
    A: TryFromValue,
{
    fn try_from_value(value: &Value) -> Result<Self, DxrError> {
        let elements = value.as_array()?.elements();
        if elements.len() != 1 {
            return Err(DxrError::parameter_mismatch(1, elements.len()));
        }
        Ok((A::try_from_value(&elements[0])?,))
    }
}

macro_rules! impl_try_to_params_tuple {
    ($($t:ident),+) => {
        impl<$($t),+> TryToParams for ($($t,)+)
        where
            $($t: ToDXR,)+
        {
            #[allow(non_snake_case)]
            fn try_to_params(&self) -> Result<Vec<Value>, DxrError> {
                let ($($t,)+) = self;
                Ok(vec![$($t.to_dxr()?),+])
            }
        }
    };
}

impl_try_to_params_tuple!(A);
impl_try_to_params_tuple!(A, B);
impl_try_to_params_tuple!(A, B, C);
impl_try_to_params_tuple!(A, B, C, D);
