//! The augmented circuit: one step of the computation together with the
//! verification of the fold of the previous instance of the other side of
//! the cycle.
//!
//! The circuit over `F` folds instances committed on `G`, a curve whose base
//! field is `F`: the commitments are combined with native arithmetic, and
//! only the two public inputs, which live in the scalar field of `G`, are
//! handled with limbs. The same template is used on both sides of the
//! cycle; they only differ by the base case, see [AugmentedCircuitParams].
//!
//! Public inputs:
//! 1. the second public input of the incoming instance, which is the hash
//!    computed by the other side, forwarded back to it;
//! 2. `H(pp, i + 1, z_0, z_{i+1}, U')` where `U'` is the new running instance.

use crate::{
    arithmetization::{CircuitBuilder, PlainInstance, RelaxedInstance, Variable},
    circuits::{
        gadgets::{
            bits::{pack_bits, split_unique},
            AllocatedNonNative, AllocatedPoint, PoseidonGadget,
        },
        step::StepCircuit,
    },
    curve::SangriaCurve,
    error::SangriaError,
    transcript::scalar_to_base,
    Result, CHALLENGE_BITS, HASH_BITS, LIMB_BITS, NUMBER_OF_COLUMNS, NUMBER_OF_LIMBS,
    NUMBER_OF_PUBLIC_INPUTS,
};
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use sangria_poseidon::poseidon::ArithmeticSpongeParams;
use sangria_utils::FieldHelpers;

/// Fresh public inputs are hashes of [HASH_BITS] bits.
const FRESH_TOP_LIMB_BITS: usize = HASH_BITS - (NUMBER_OF_LIMBS - 1) * LIMB_BITS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AugmentedCircuitParams {
    /// The primary circuit starts from the default running instance, the
    /// secondary one from the relaxed first instance of the primary.
    pub is_primary: bool,
}

/// The advice of one synthesis.
#[derive(Clone, Debug)]
pub struct AugmentedCircuitInputs<G: AffineRepr> {
    pub pp_digest: G::BaseField,
    pub i: u64,
    pub z0: Vec<G::BaseField>,
    pub zi: Vec<G::BaseField>,
    /// The running instance of the other side
    pub running: RelaxedInstance<G>,
    /// The latest instance of the other side
    pub incoming: PlainInstance<G>,
    /// The commitment to the cross term of their fold
    pub comm_t: G,
}

impl<G: AffineRepr> AugmentedCircuitInputs<G> {
    /// Inputs of step 0. Nothing is checked about the instances, which are
    /// replaced by `dummy`.
    pub fn base(pp_digest: G::BaseField, z0: Vec<G::BaseField>, dummy: G) -> Self {
        Self {
            pp_digest,
            i: 0,
            zi: z0.clone(),
            z0,
            running: RelaxedInstance::default(NUMBER_OF_PUBLIC_INPUTS),
            incoming: PlainInstance::new(
                [dummy; NUMBER_OF_COLUMNS],
                vec![G::ScalarField::zero(); NUMBER_OF_PUBLIC_INPUTS],
            ),
            comm_t: dummy,
        }
    }
}

struct AllocatedRelaxedInstance {
    commitments: [AllocatedPoint; NUMBER_OF_COLUMNS],
    error_commitment: AllocatedPoint,
    u: Variable,
    public_inputs: [AllocatedNonNative; NUMBER_OF_PUBLIC_INPUTS],
}

struct AllocatedPlainInstance {
    commitments: [AllocatedPoint; NUMBER_OF_COLUMNS],
    public_inputs: [AllocatedNonNative; NUMBER_OF_PUBLIC_INPUTS],
}

fn check_public_inputs<S>(x: &[S]) -> Result<()> {
    if x.len() != NUMBER_OF_PUBLIC_INPUTS {
        return Err(SangriaError::Synthesis(format!(
            "instances of the other side have {} public inputs, expected {}",
            x.len(),
            NUMBER_OF_PUBLIC_INPUTS
        )));
    }
    Ok(())
}

impl AllocatedRelaxedInstance {
    fn alloc<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        builder: &mut CircuitBuilder<F>,
        instance: &RelaxedInstance<G>,
    ) -> Result<Self> {
        check_public_inputs(&instance.public_inputs)?;
        let commitments =
            std::array::from_fn(|j| AllocatedPoint::alloc(builder, &instance.commitments[j]));
        let error_commitment = AllocatedPoint::alloc(builder, &instance.error_commitment);
        let u = builder.alloc(scalar_to_base(&instance.u));
        let public_inputs = std::array::from_fn(|j| {
            AllocatedNonNative::alloc(builder, &instance.public_inputs[j].to_biguint(), LIMB_BITS)
        });
        Ok(Self {
            commitments,
            error_commitment,
            u,
            public_inputs,
        })
    }

    /// The absorbed encoding, see [crate::transcript::relaxed_instance_to_fields].
    fn to_fields<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>) -> Vec<Variable> {
        let mut fields: Vec<Variable> = self
            .commitments
            .iter()
            .chain(std::iter::once(&self.error_commitment))
            .flat_map(|p| p.to_fields())
            .collect();
        fields.push(self.u);
        for x in self.public_inputs.iter() {
            fields.extend(x.halves(builder));
        }
        fields
    }

    fn select<F: PrimeField>(
        builder: &mut CircuitBuilder<F>,
        cond: Variable,
        t: &Self,
        f: &Self,
    ) -> Self {
        Self {
            commitments: std::array::from_fn(|j| {
                AllocatedPoint::select(builder, cond, &t.commitments[j], &f.commitments[j])
            }),
            error_commitment: AllocatedPoint::select(
                builder,
                cond,
                &t.error_commitment,
                &f.error_commitment,
            ),
            u: builder.select(cond, t.u, f.u),
            public_inputs: std::array::from_fn(|j| {
                AllocatedNonNative::select(builder, cond, &t.public_inputs[j], &f.public_inputs[j])
            }),
        }
    }
}

impl AllocatedPlainInstance {
    fn alloc<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        builder: &mut CircuitBuilder<F>,
        instance: &PlainInstance<G>,
    ) -> Result<Self> {
        check_public_inputs(&instance.public_inputs)?;
        let commitments = std::array::from_fn(|j| {
            AllocatedPoint::alloc_finite(builder, &instance.commitments[j])
        });
        let public_inputs = std::array::from_fn(|j| {
            AllocatedNonNative::alloc(
                builder,
                &instance.public_inputs[j].to_biguint(),
                FRESH_TOP_LIMB_BITS,
            )
        });
        Ok(Self {
            commitments,
            public_inputs,
        })
    }

    /// The encoding of the relaxed form of this instance: `E = 0`, `u = 1`.
    fn to_relaxed_fields<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>) -> Vec<Variable> {
        let mut fields: Vec<Variable> = self
            .commitments
            .iter()
            .flat_map(|p| p.to_fields())
            .collect();
        let zero = builder.zero();
        fields.extend([zero, zero, builder.one()]);
        for x in self.public_inputs.iter() {
            fields.extend(x.halves(builder));
        }
        fields
    }

    fn relax<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>) -> AllocatedRelaxedInstance {
        AllocatedRelaxedInstance {
            commitments: self.commitments,
            error_commitment: AllocatedPoint::identity(builder),
            u: builder.one(),
            public_inputs: self.public_inputs.clone(),
        }
    }
}

/// `H(pp, i, z_0, z_i, U)` truncated to [HASH_BITS] bits.
fn hash_public_io<F: PrimeField>(
    builder: &mut CircuitBuilder<F>,
    sponge_params: &ArithmeticSpongeParams<F>,
    pp: Variable,
    i: Variable,
    z0: &[Variable],
    zi: &[Variable],
    running: &AllocatedRelaxedInstance,
) -> Variable {
    let mut sponge = PoseidonGadget::new(builder, sponge_params);
    sponge.absorb(builder, &[pp, i]);
    sponge.absorb(builder, z0);
    sponge.absorb(builder, zi);
    let fields = running.to_fields(builder);
    sponge.absorb(builder, &fields);
    let squeezed = sponge.squeeze(builder);
    let (_, hash) = split_unique(builder, squeezed, HASH_BITS);
    hash
}

pub struct AugmentedCircuit<'a, F: PrimeField, G: SangriaCurve<BaseField = F>, SC: StepCircuit<F>>
{
    params: AugmentedCircuitParams,
    sponge_params: &'a ArithmeticSpongeParams<F>,
    offset: G,
    step: &'a SC,
}

impl<'a, F, G, SC> AugmentedCircuit<'a, F, G, SC>
where
    F: PrimeField,
    G: SangriaCurve<BaseField = F>,
    SC: StepCircuit<F>,
{
    /// `offset` is the fixed point the scalar multiplications start from.
    pub fn new(
        params: AugmentedCircuitParams,
        sponge_params: &'a ArithmeticSpongeParams<F>,
        offset: G,
        step: &'a SC,
    ) -> Self {
        Self {
            params,
            sponge_params,
            offset,
            step,
        }
    }

    /// Add the circuit to `builder` with the values of `inputs`, and return
    /// the next state `z_{i+1}`.
    pub fn synthesize(
        &self,
        builder: &mut CircuitBuilder<F>,
        inputs: &AugmentedCircuitInputs<G>,
    ) -> Result<Vec<F>> {
        let arity = self.step.arity();
        if inputs.z0.len() != arity || inputs.zi.len() != arity {
            return Err(SangriaError::Synthesis(format!(
                "{} expects a state of {} elements",
                SC::NAME,
                arity
            )));
        }

        let pp = builder.alloc(inputs.pp_digest);
        let i = builder.alloc(F::from(inputs.i));
        let z0: Vec<Variable> = inputs.z0.iter().map(|z| builder.alloc(*z)).collect();
        let zi: Vec<Variable> = inputs.zi.iter().map(|z| builder.alloc(*z)).collect();
        let running = AllocatedRelaxedInstance::alloc(builder, &inputs.running)?;
        let incoming = AllocatedPlainInstance::alloc(builder, &inputs.incoming)?;
        let comm_t = AllocatedPoint::alloc_finite(builder, &inputs.comm_t);

        let is_base = builder.is_zero(i);

        // The incoming instance carries the hash of the running one
        let h_in = hash_public_io(builder, self.sponge_params, pp, i, &z0, &zi, &running);
        let forwarded = incoming.public_inputs[0].to_native(builder);
        let diff = builder.sub(forwarded, h_in);
        builder.assert_zero_unless(is_base, diff);

        // The folding challenge, over pp, U, u and T
        let r_bits = {
            let mut sponge = PoseidonGadget::new(builder, self.sponge_params);
            sponge.absorb(builder, &[pp]);
            let fields = running.to_fields(builder);
            sponge.absorb(builder, &fields);
            let fields = incoming.to_relaxed_fields(builder);
            sponge.absorb(builder, &fields);
            sponge.absorb(builder, &comm_t.to_fields());
            let squeezed = sponge.squeeze(builder);
            let (bits, _) = split_unique(builder, squeezed, CHALLENGE_BITS);
            bits
        };
        let r = pack_bits(builder, &r_bits);

        let folded = {
            let commitments = std::array::from_fn(|j| {
                let p = incoming.commitments[j].scalar_mul(builder, &r_bits, &self.offset);
                running.commitments[j].add_to_finite(builder, &p)
            });
            let t = comm_t.scalar_mul(builder, &r_bits, &self.offset);
            let error_commitment = running.error_commitment.add_to_finite(builder, &t);
            let u = builder.add(running.u, r);
            let modulus = G::ScalarField::modulus_biguint();
            let public_inputs = std::array::from_fn(|j| {
                AllocatedNonNative::mul_add_mod(
                    builder,
                    &running.public_inputs[j],
                    &r_bits,
                    &incoming.public_inputs[j],
                    &modulus,
                )
            });
            AllocatedRelaxedInstance {
                commitments,
                error_commitment,
                u,
                public_inputs,
            }
        };

        let base = if self.params.is_primary {
            let zero = builder.zero();
            let x = AllocatedNonNative::zero(builder);
            AllocatedRelaxedInstance {
                commitments: std::array::from_fn(|_| AllocatedPoint::identity(builder)),
                error_commitment: AllocatedPoint::identity(builder),
                u: zero,
                public_inputs: [x.clone(), x],
            }
        } else {
            incoming.relax(builder)
        };
        let next_running = AllocatedRelaxedInstance::select(builder, is_base, &base, &folded);

        let z_next = self.step.synthesize(builder, &zi)?;
        if z_next.len() != arity {
            return Err(SangriaError::Synthesis(format!(
                "{} returned a state of {} elements instead of {}",
                SC::NAME,
                z_next.len(),
                arity
            )));
        }

        let i_next = builder.add_constant(i, F::one());
        let h_out = hash_public_io(
            builder,
            self.sponge_params,
            pp,
            i_next,
            &z0,
            &z_next,
            &next_running,
        );

        let forwarded_back = incoming.public_inputs[1].to_native(builder);
        builder.public_input(forwarded_back);
        builder.public_input(h_out);

        Ok(builder.values(&z_next))
    }
}
